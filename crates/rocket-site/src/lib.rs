//! Static site assembly for Rocket.
//!
//! [`SiteBuilder`] turns a site directory into HTML:
//!
//! 1. [`Scanner`] finds pages and data files under the site root
//! 2. [`Page::load`] reads each page and assembles its context
//! 3. [`global_context`] collects data files and sorted posts
//! 4. assets are copied into the output directory
//! 5. each page is rendered as a template, converted from Markdown when
//!    needed, wrapped in its layout and written out
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use rocket_config::Config;
//! use rocket_site::SiteBuilder;
//!
//! let config = Config::default_with_base(Path::new("my-site"));
//! let report = SiteBuilder::new(config).build().unwrap();
//! println!("{} pages", report.pages_written);
//! ```

mod builder;
mod context;
mod error;
mod paths;
pub mod seo;
mod templates;

pub use builder::{BuildReport, DEFAULT_LAYOUT_BLOCK, SiteBuilder};
pub use context::{Page, global_context};
pub use error::SiteError;
pub use paths::{PageKind, PageRef, Scanner, SitePaths, output_path, site_url_path};
pub use templates::{DEFAULT_DATE_FORMAT, Templates};
