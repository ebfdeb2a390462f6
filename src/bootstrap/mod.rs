pub mod init_db;
