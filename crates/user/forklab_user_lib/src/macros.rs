/// Appends formatted text to an [`OutputBuffer`](crate::io::OutputBuffer).
///
/// Evaluates to `Result<(), ForklabError>`; nothing is appended when the
/// formatted text does not fit.
#[macro_export]
macro_rules! buf_append {
    ($buf:expr, $($arg:tt)*) => {
        $buf.append(::core::format_args!($($arg)*))
    };
}
