pub mod wechat;
pub mod link;
pub mod session;
pub mod initiator;
