use crate::entity::gram;
use crate::identity::Identity;

/// Only the owner of a gram may edit, update or delete it.
pub fn can_modify(identity: &Identity, gram: &gram::Model) -> bool {
    identity.user_id == gram.user_id
}
