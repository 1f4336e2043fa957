//! State and persistence layer of the studio's QnA editor: a pure list state
//! machine ([`qna::state`]), an async save dispatcher in front of it
//! ([`qna::dispatch`]) and the pre-save validator ([`qna::validate`]),
//! together with the action-instruction and form helpers the studio shares
//! with the bot runtime.

pub mod action;
pub mod form;
pub mod lang;
pub mod qna;
pub mod result;
pub mod topic;
