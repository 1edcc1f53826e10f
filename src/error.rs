use std;

use trackable::error::TrackableError;
use trackable::error::{ErrorKind as TrackableErrorKind, ErrorKindExt};

/// The fatal-failure taxonomy from spec.md §7. Non-fatal conditions
/// (`UnknownTraceSubtype`, `UnknownStreamType`, `UnknownLineId`) are not
/// represented here — they are logged and the decode continues.
#[derive(Debug, Clone)]
pub enum ErrorKind {
    /// The 8-byte file header matched neither the little- nor big-endian magic.
    BadMagic,

    /// The byte source could not satisfy a `read`/`skip` request.
    Underflow,

    /// A `StreamItem` declared a size of zero.
    ZeroItem,

    /// A `Description` item declared more bytes than its payload holds.
    Corrupted,

    /// An argument descriptor carried a type tag outside the known table.
    UnknownArgument,

    /// Any other failure (e.g. host I/O) that does not fit the taxonomy above.
    Io,
}
impl TrackableErrorKind for ErrorKind {}

#[derive(Debug, Clone)]
pub struct Error(TrackableError<ErrorKind>);
derive_traits_for_trackable_error_newtype!(Error, ErrorKind);
impl From<std::io::Error> for Error {
    fn from(f: std::io::Error) -> Self {
        ErrorKind::Io.cause(f).into()
    }
}
