pub mod nominatim;
pub mod openweather;
