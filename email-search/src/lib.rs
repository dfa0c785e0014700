//! Rust library to evaluate and translate email search terms.
//!
//! The main purpose of this library is to decide whether email
//! messages match a search query, either locally or by delegating
//! the search to a remote server.
//!
//! A query is a tree of [`SearchTerm`](crate::term::SearchTerm)s:
//! leaf terms (addresses, subject, body, headers, flags, size,
//! dates, attachments, mailbox) combined with `and`, `or` and `not`.
//! The same tree can be:
//!
//! - evaluated against in-memory messages, see
//!   [`MessageView`](crate::message::MessageView) and
//!   [`search`](crate::search::search)
//! - evaluated against lazy message sources which fetch raw data on
//!   demand, see [`MessageSource`](crate::message::MessageSource) and
//!   [`search_sources`](crate::search::search_sources)
//! - translated into a remote query, see
//!   [`RemoteQuery`](crate::remote::RemoteQuery)
//! - split into a remote query and a local verification, see
//!   [`RemoteSearch`](crate::search::RemoteSearch)
//!
//! Text patterns support two wildcards: `*` matches any sequence of
//! characters, `?` matches exactly one character. See the
//! [`wildcard`] module.
//!
//! See examples in the /tests folder.

pub mod comparison;
pub mod config;
mod error;
pub mod fetch;
pub mod message;
pub mod pattern;
pub mod remote;
pub mod search;
pub mod term;
pub mod wildcard;

#[doc(inline)]
pub use self::{
    config::SearchConfig,
    error::{AnyBoxedError, Error, Result},
    search::{search, search_sources, RemoteSearch},
    term::{SearchTerm, TermKind},
};
