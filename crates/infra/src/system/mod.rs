use chrono::{Local, NaiveDateTime};

// Mocking out time so that it is possible to run tests that depend on time.
pub trait ISys: Send + Sync {
    /// The current wall clock time of the host
    fn local_now(&self) -> NaiveDateTime;
}

/// System that gets the real time and is used when not testing
pub struct RealSys {}
impl ISys for RealSys {
    fn local_now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// System frozen at a given wall clock time
pub struct StaticTimeSys {
    pub now: NaiveDateTime,
}
impl ISys for StaticTimeSys {
    fn local_now(&self) -> NaiveDateTime {
        self.now
    }
}
