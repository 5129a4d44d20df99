//! This module provides ways to tweak the mocked backend, so that it can return errors on some tests
#![cfg(feature = "mocks")]

use crate::error::TransportError;
use crate::mock_backend::Endpoint;

/// This stores some behaviour tweaks, that describe how a mocked backend will behave during a given test
///
/// So that an endpoint fails _n_ times after _m_ initial successes, set `(m, n)` for the suited parameter
#[derive(Default, Clone, Debug)]
pub struct MockBehaviour {
    /// If this is true, every request will be allowed
    pub is_suspended: bool,

    pub login_behaviour: (u32, u32),
    pub register_behaviour: (u32, u32),
    pub renew_behaviour: (u32, u32),

    pub list_events_behaviour: (u32, u32),
    pub create_event_behaviour: (u32, u32),
    pub update_event_behaviour: (u32, u32),
    pub delete_event_behaviour: (u32, u32),
}

impl MockBehaviour {
    pub fn new() -> Self {
        Self::default()
    }

    /// All endpoints will fail at once, for `n_fails` times
    pub fn fail_now(n_fails: u32) -> Self {
        Self {
            is_suspended: false,
            login_behaviour: (0, n_fails),
            register_behaviour: (0, n_fails),
            renew_behaviour: (0, n_fails),
            list_events_behaviour: (0, n_fails),
            create_event_behaviour: (0, n_fails),
            update_event_behaviour: (0, n_fails),
            delete_event_behaviour: (0, n_fails),
        }
    }

    /// Suspend this mock behaviour until you call `resume`
    pub fn suspend(&mut self) {
        self.is_suspended = true;
    }
    /// Make this behaviour active again
    pub fn resume(&mut self) {
        self.is_suspended = false;
    }

    /// Whether a request to this endpoint should go through, or fail with a network error
    pub fn can_request(&mut self, endpoint: Endpoint) -> Result<(), TransportError> {
        if self.is_suspended { return Ok(()) }
        let value = match endpoint {
            Endpoint::Login => &mut self.login_behaviour,
            Endpoint::Register => &mut self.register_behaviour,
            Endpoint::Renew => &mut self.renew_behaviour,
            Endpoint::ListEvents => &mut self.list_events_behaviour,
            Endpoint::CreateEvent => &mut self.create_event_behaviour,
            Endpoint::UpdateEvent(_) => &mut self.update_event_behaviour,
            Endpoint::DeleteEvent(_) => &mut self.delete_event_behaviour,
        };
        decrement(value, endpoint.name())
    }
}


/// Return Ok(()) in case the value is `(1+, _)` or `(_, 0)`, or return Err and decrement otherwise
fn decrement(value: &mut (u32, u32), descr: &str) -> Result<(), TransportError> {
    let remaining_successes = value.0;
    let remaining_failures = value.1;

    if remaining_successes > 0 {
        value.0 = value.0 - 1;
        log::debug!("Mock behaviour: allowing a {} ({:?})", descr, value);
        Ok(())
    } else {
        if remaining_failures > 0 {
            value.1 = value.1 - 1;
            log::debug!("Mock behaviour: failing a {} ({:?})", descr, value);
            Err(TransportError::Network(format!("Mocked behaviour requires this {} to fail this time. ({:?})", descr, value)))
        } else {
            log::debug!("Mock behaviour: allowing a {} ({:?})", descr, value);
            Ok(())
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_mock_behaviour() {
        let mut ok = MockBehaviour::new();
        for _ in 0..5 {
            assert!(ok.can_request(Endpoint::Login).is_ok());
            assert!(ok.can_request(Endpoint::ListEvents).is_ok());
        }

        let mut now = MockBehaviour::fail_now(2);
        assert!(now.can_request(Endpoint::Login).is_err());
        assert!(now.can_request(Endpoint::CreateEvent).is_err());
        assert!(now.can_request(Endpoint::CreateEvent).is_err());
        assert!(now.can_request(Endpoint::Login).is_err());
        assert!(now.can_request(Endpoint::Login).is_ok());
        assert!(now.can_request(Endpoint::Login).is_ok());
        assert!(now.can_request(Endpoint::CreateEvent).is_ok());

        let mut custom = MockBehaviour{
            renew_behaviour: (0,1),
            delete_event_behaviour: (1,3),
            ..MockBehaviour::default()
        };
        assert!(custom.can_request(Endpoint::Renew).is_err());
        assert!(custom.can_request(Endpoint::Renew).is_ok());
        assert!(custom.can_request(Endpoint::Renew).is_ok());
        assert!(custom.can_request(Endpoint::DeleteEvent("1".into())).is_ok());
        assert!(custom.can_request(Endpoint::DeleteEvent("1".into())).is_err());
        assert!(custom.can_request(Endpoint::DeleteEvent("1".into())).is_err());
        assert!(custom.can_request(Endpoint::DeleteEvent("1".into())).is_err());
        assert!(custom.can_request(Endpoint::DeleteEvent("1".into())).is_ok());

        let mut suspended = MockBehaviour::fail_now(1);
        suspended.suspend();
        assert!(suspended.can_request(Endpoint::UpdateEvent("1".into())).is_ok());
        suspended.resume();
        assert!(suspended.can_request(Endpoint::UpdateEvent("1".into())).is_err());
    }
}
