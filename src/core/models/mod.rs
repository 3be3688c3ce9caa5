pub mod authorized_key;
