//! The library code for the `wayfarer` static blog generator. The
//! architecture can be generally broken down into two distinct steps:
//!
//! 1. Crawling the posts out of the headless CMS that hosts them
//!    ([`crate::cms`], [`crate::page`])
//! 2. Converting the posts into output files on disk ([`crate::write`])
//!
//! The first step accumulates the paginated post listing one cursor at a
//! time ([`crate::page`]) and then fetches each post's full document by
//! uid. The second step derives the display fields -- formatted dates
//! and rendered rich text ([`crate::richtext`]) and the reading-time
//! estimate ([`crate::readtime`]) -- and applies the theme templates to
//! produce index pages, post pages, and the not-found page. The index is
//! paginated into groups of pages based on a configurable number of
//! summaries per index page.
//!
//! [`crate::build`] stitches both steps together, adds the static-asset
//! copy and the Atom feed, and gates the whole run behind the output's
//! revalidation window.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod cms;
pub mod config;
pub mod feed;
pub mod page;
pub mod post;
pub mod readtime;
pub mod richtext;
pub mod value;
pub mod write;
