pub mod seen_links;

pub use seen_links::SeenLinkStore;
