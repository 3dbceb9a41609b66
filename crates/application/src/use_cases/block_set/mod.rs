mod add_site;
mod remove_site;

pub use add_site::AddSiteUseCase;
pub use remove_site::RemoveSiteUseCase;
