//! Configuration module

mod site;

pub use site::CmsConfig;
pub use site::ContactConfig;
pub use site::ServerConfig;
pub use site::SiteConfig;
pub use site::SocialLink;
