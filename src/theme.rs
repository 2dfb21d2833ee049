//! Process-wide theme flag with observers

use crate::observable::{Observable, SubscriptionId};
use crate::types::Theme;

#[derive(Debug, Clone, Default)]
pub struct ThemeState {
    flag: Observable<Theme>,
}

impl ThemeState {
    pub fn new(initial: Theme) -> Self {
        Self {
            flag: Observable::new(initial),
        }
    }

    pub fn get(&self) -> Theme {
        *self.flag.get()
    }

    pub fn is_dark(&self) -> bool {
        self.get() == Theme::Dark
    }

    pub fn set(&self, theme: Theme) {
        self.flag.set(theme);
    }

    pub fn toggle(&self) -> Theme {
        let next = self.get().toggled();
        self.flag.set(next);
        next
    }

    pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: FnMut(&Theme) + 'static,
    {
        self.flag.subscribe(observer)
    }
}
