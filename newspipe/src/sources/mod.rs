pub mod url_list;

pub use url_list::SourceLoader;
