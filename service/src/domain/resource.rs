//! [`Resource`] definitions.

use common::define_kind;

define_kind! {
    #[doc = "Collection managed through the back-office."]
    enum Resource {
        #[doc = "Events and parties."]
        Event = 1,

        #[doc = "Spas."]
        Spa = 2,

        #[doc = "Gyms."]
        Gym = 3,

        #[doc = "Personal trainers."]
        PersonalTrainer = 4,

        #[doc = "Merchandise orders."]
        MerchOrder = 5,

        #[doc = "Visa applications."]
        Visa = 6,

        #[doc = "CMS content blocks."]
        Cms = 7,

        #[doc = "Platform users."]
        User = 8,

        #[doc = "Bookings of events, venues and trainers."]
        Booking = 9,
    }
}

impl Resource {
    /// Returns the API path of this [`Resource`] collection.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Event => "events",
            Self::Spa => "spas",
            Self::Gym => "gyms",
            Self::PersonalTrainer => "trainers",
            Self::MerchOrder => "merch/orders",
            Self::Visa => "visas",
            Self::Cms => "cms",
            Self::User => "users",
            Self::Booking => "bookings",
        }
    }

    /// Returns the API path of a single item of this [`Resource`].
    ///
    /// The `id` is percent-encoded as a single path segment.
    #[must_use]
    pub fn item_path(self, id: &str) -> String {
        format!("{}/{}", self.path(), urlencoding::encode(id))
    }
}
