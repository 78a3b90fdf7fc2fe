use prov_ledger::meta;
use prov_types::{ActorSnapshot, LifecycleAction, MetaValue, Metadata};

/// One lifecycle event waiting to be recorded.
///
/// Builder for the action/actor/metadata triple. The `with_*` helpers
/// write the conventional metadata keys so call sites don't spell them
/// by hand; `with_meta` takes anything else.
#[derive(Clone, Debug)]
pub struct EventRequest {
    pub action: LifecycleAction,
    pub actor: ActorSnapshot,
    pub metadata: Metadata,
}

impl EventRequest {
    pub fn new(action: LifecycleAction, actor: ActorSnapshot) -> Self {
        Self {
            action,
            actor,
            metadata: Metadata::new(),
        }
    }

    pub fn with_trust_score(mut self, score: i64) -> Self {
        self.metadata
            .insert(meta::TRUST_SCORE.into(), MetaValue::Int(score));
        self
    }

    pub fn with_grade(mut self, grade: impl Into<String>) -> Self {
        self.metadata
            .insert(meta::GRADE.into(), MetaValue::Str(grade.into()));
        self
    }

    pub fn with_price(mut self, price: i64) -> Self {
        self.metadata
            .insert(meta::PRICE.into(), MetaValue::Int(price));
        self
    }

    pub fn with_buyer(mut self, buyer_id: impl Into<String>) -> Self {
        self.metadata
            .insert(meta::BUYER_ID.into(), MetaValue::Str(buyer_id.into()));
        self
    }

    pub fn with_changed_fields(mut self, fields: Vec<String>) -> Self {
        self.metadata
            .insert(meta::CHANGED_FIELDS.into(), MetaValue::List(fields));
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.metadata
            .insert(meta::NOTES.into(), MetaValue::Str(note.into()));
        self
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<MetaValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}
