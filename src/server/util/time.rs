#[cfg(not(test))]
use chrono::{DateTime, Utc};

pub(crate) mod helper {
    #[cfg(not(test))]
    pub(crate) use super::get_utc_now;
    #[cfg(test)]
    pub(crate) use super::mock_chrono::{get_utc_now, set_mock_now};
}


#[cfg(not(test))]
pub(crate) fn get_utc_now() -> DateTime<Utc> {
    Utc::now()
}
