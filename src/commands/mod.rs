pub mod init;
pub mod publish;
