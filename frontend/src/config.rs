/// Tile server, overridable at build time with `WORKOUT_TRACKER_TILE_URL`.
pub const TILE_URL: &str = match option_env!("WORKOUT_TRACKER_TILE_URL") {
    Some(url) => url,
    None => "https://{s}.tile.openstreetmap.fr/hot/{z}/{x}/{y}.png",
};

pub const TILE_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";

pub const MAP_ZOOM: f64 = 13.;
pub const MAX_ZOOM: f64 = 19.;

pub const POPUP_MAX_WIDTH: f64 = 250.;
pub const POPUP_MIN_WIDTH: f64 = 100.;

pub const POSITION_DENIED_MESSAGE: &str = "could not get your position";

/// Duration of the animated pan to a workout, in seconds.
pub const PAN_DURATION: f64 = 1.;

pub const LOG_FILTER: &str = "workout_tracker_lib=debug,frontend=info";
