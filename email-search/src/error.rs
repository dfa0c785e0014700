use std::{error, result};

use thiserror::Error;

use crate::term::TermKind;

/// The global `Result` alias of the library.
pub type Result<T> = result::Result<T, Error>;

/// The global boxed `Error` alias used by message sources.
///
/// Message sources are implemented outside of this library, their
/// errors are not known at compilation time.
pub type AnyBoxedError = Box<dyn error::Error + Send + Sync + 'static>;

/// The global `Error` enum of the library.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot build flag term: flag set is empty")]
    BuildFlagTermEmptyError,
    #[error("cannot build flag term: custom flag {0} needs a user flag term")]
    BuildFlagTermCustomFlagError(String),
    #[error("cannot build user flag term: label set is empty")]
    BuildUserFlagTermEmptyError,
    #[error("cannot build user flag term: label is empty")]
    BuildUserFlagTermEmptyLabelError,
    #[error("cannot build header term: header name is empty")]
    BuildHeaderTermEmptyNameError,
    #[error("cannot build mailbox term: mailbox name is empty")]
    BuildMailboxTermEmptyNameError,

    #[error("cannot translate {0} term into a remote search query")]
    TranslateUnsupportedTermError(TermKind),

    #[error("cannot parse raw message {0}")]
    ParseRawMessageError(String),
    #[error("cannot fetch data of message {1}")]
    FetchMessageDataError(#[source] AnyBoxedError, String),
    #[error("cannot fetch message {0}: message has been expunged")]
    MessageExpungedError(String),

    #[error("cannot parse unknown comparison type {0}")]
    ParseComparisonTypeError(String),
    #[error("cannot parse unknown search term kind {0}")]
    ParseTermKindError(String),
    #[error("cannot parse unknown flag {0}")]
    ParseFlagError(String),
}
