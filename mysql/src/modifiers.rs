//! MySQL statement modifier extensions.
//!
//! The modifiers are stored on the core builders; rendering them against a
//! dialect other than MySQL fails.

use chaos_core::{Delete, Insert, Modifier, Select, Update};

pub trait MySQLSelectExt: Sized {
    #[must_use]
    fn high_priority(self) -> Self;
}

impl MySQLSelectExt for Select {
    fn high_priority(self) -> Self {
        self.modifier(Modifier::HighPriority)
    }
}

pub trait MySQLInsertExt: Sized {
    #[must_use]
    fn low_priority(self) -> Self;
    #[must_use]
    fn delayed(self) -> Self;
    #[must_use]
    fn high_priority(self) -> Self;
    #[must_use]
    fn ignore(self) -> Self;
}

impl MySQLInsertExt for Insert {
    fn low_priority(self) -> Self {
        self.modifier(Modifier::LowPriority)
    }

    fn delayed(self) -> Self {
        self.modifier(Modifier::Delayed)
    }

    fn high_priority(self) -> Self {
        self.modifier(Modifier::HighPriority)
    }

    fn ignore(self) -> Self {
        self.modifier(Modifier::Ignore)
    }
}

pub trait MySQLUpdateExt: Sized {
    #[must_use]
    fn low_priority(self) -> Self;
    #[must_use]
    fn ignore(self) -> Self;
}

impl MySQLUpdateExt for Update {
    fn low_priority(self) -> Self {
        self.modifier(Modifier::LowPriority)
    }

    fn ignore(self) -> Self {
        self.modifier(Modifier::Ignore)
    }
}

pub trait MySQLDeleteExt: Sized {
    #[must_use]
    fn low_priority(self) -> Self;
    #[must_use]
    fn quick(self) -> Self;
    #[must_use]
    fn ignore(self) -> Self;
}

impl MySQLDeleteExt for Delete {
    fn low_priority(self) -> Self {
        self.modifier(Modifier::LowPriority)
    }

    fn quick(self) -> Self {
        self.modifier(Modifier::Quick)
    }

    fn ignore(self) -> Self {
        self.modifier(Modifier::Ignore)
    }
}
