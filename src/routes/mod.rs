pub mod pages;
pub mod qrcode;
pub mod visitors;
