pub mod request_ip;
