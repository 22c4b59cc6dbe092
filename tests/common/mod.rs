#![allow(dead_code)]

pub mod external_server;
pub mod score_server;
