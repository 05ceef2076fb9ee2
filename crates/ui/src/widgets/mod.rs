pub mod range_slider;
