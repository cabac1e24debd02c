pub mod packet_decode;
