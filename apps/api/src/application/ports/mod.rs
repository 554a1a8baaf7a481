pub mod federation;
