//! A flag that tells whether the event editor is open

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct UiFlagStore {
    is_date_modal_open: bool,
}

impl UiFlagStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.is_date_modal_open
    }

    pub fn open(&mut self) {
        self.is_date_modal_open = true;
    }

    pub fn close(&mut self) {
        self.is_date_modal_open = false;
    }

    pub fn toggle(&mut self) {
        self.is_date_modal_open = !self.is_date_modal_open;
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_close_toggle() {
        let mut flag = UiFlagStore::new();
        assert_eq!(flag.is_open(), false);

        flag.open();
        assert!(flag.is_open());
        flag.close();
        assert_eq!(flag.is_open(), false);

        flag.toggle();
        assert!(flag.is_open());
        flag.toggle();
        assert_eq!(flag.is_open(), false);
    }
}
