pub mod view_factor;
