use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Clone,
            Copy,
            Debug,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Mint a fresh random identity.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// First 8 hex characters, used in human-facing file names.
            pub fn short(&self) -> String {
                self.0.simple().to_string()[..8].to_owned()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

entity_id!(
    /// Identity of a template.
    TemplateId
);
entity_id!(
    /// Identity of a slide within a template.
    SlideId
);
entity_id!(
    /// Identity of a layer. Layer ids are globally unique, not scoped to
    /// their slide.
    LayerId
);
entity_id!(
    /// Identity of a generated post.
    PostId
);
entity_id!(
    /// Identity of an image collection.
    CollectionId
);
entity_id!(
    /// Identity of a stored image.
    ImageId
);
entity_id!(
    /// Identity of an owning organization.
    OrgId
);
