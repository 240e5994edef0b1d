pub mod topic;
pub mod upload;
