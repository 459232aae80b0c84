//! 도메인 모델.
//!
//! - [`EntityId`]: 저장소가 생성하는 불변 식별자
//! - [`Entity`]: 저장소와 유스케이스가 공유하는 엔티티 계약
//! - [`User`], [`Role`], [`Claim`]: 세 가지 엔티티 종류

mod claim;
mod entity;
mod id;
mod role;
mod user;

pub use claim::{Claim, ClaimDraft, ClaimPatch};
pub use entity::{now, Entity};
pub use id::EntityId;
pub use role::{Role, RoleDraft, RolePatch};
pub use user::{User, UserDraft, UserPatch};
