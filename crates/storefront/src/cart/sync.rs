//! Cart service: applies actions and mirrors them to the backend.
//!
//! Anonymous carts live only in the session. For signed-in users on a
//! backend with a cart mirror, every action is applied to a copy, the
//! difference is pushed line by line, and the copy replaces the session
//! cart only if every push succeeded. A failed push leaves the cart exactly
//! as it was.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::SecretString;
use thiserror::Error;
use tracing::instrument;

use medplus_core::{ProductId, UserId};

use tower_sessions::Session;

use super::lock::{CartLocks, CartWriteGuard};
use super::model::{Cart, CartAction};
use crate::backend::BackendError;

/// Remote copy of a user's cart lines.
#[async_trait]
pub trait CartSync: Send + Sync {
    /// Insert or overwrite the quantity for one product.
    async fn upsert_line(
        &self,
        owner: &CartOwner,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), BackendError>;

    /// Delete the line for one product.
    async fn delete_line(&self, owner: &CartOwner, product_id: ProductId)
    -> Result<(), BackendError>;
}

/// The signed-in user a cart belongs to, with the token the mirror needs.
#[derive(Clone)]
pub struct CartOwner {
    pub user_id: UserId,
    pub access_token: SecretString,
}

impl std::fmt::Debug for CartOwner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartOwner")
            .field("user_id", &self.user_id)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

/// Mirroring a cart change failed; the session cart was left unchanged.
#[derive(Debug, Error)]
pub enum CartSyncError {
    #[error("Could not update your cart. Please try again.")]
    Mirror(#[from] BackendError),
}

/// One remote write needed to bring the mirror in line with a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorOp {
    Upsert { product_id: ProductId, quantity: u32 },
    Delete { product_id: ProductId },
}

/// Writes that turn `before` into `after`, in cart order.
#[must_use]
pub fn mirror_ops(before: &Cart, after: &Cart) -> Vec<MirrorOp> {
    let upserts = after.lines().iter().filter_map(|line| {
        let id = line.product.id;
        let unchanged = before
            .line(id)
            .is_some_and(|prev| prev.quantity == line.quantity);
        (!unchanged).then_some(MirrorOp::Upsert {
            product_id: id,
            quantity: line.quantity,
        })
    });
    let deletes = before
        .lines()
        .iter()
        .filter(|line| after.line(line.product.id).is_none())
        .map(|line| MirrorOp::Delete {
            product_id: line.product.id,
        });
    upserts.chain(deletes).collect()
}

/// Applies cart actions, mirroring them when a mirror and owner are present.
#[derive(Clone, Default)]
pub struct CartService {
    mirror: Option<Arc<dyn CartSync>>,
    add_delay: Duration,
    locks: CartLocks,
}

impl CartService {
    /// Create a service; `mirror` is `None` for backends without a cart table.
    #[must_use]
    pub fn new(mirror: Option<Arc<dyn CartSync>>) -> Self {
        Self {
            mirror,
            add_delay: Duration::ZERO,
            locks: CartLocks::default(),
        }
    }

    /// Delay every add-to-cart by `delay` (demo data only).
    #[must_use]
    pub fn with_add_delay(mut self, delay: Duration) -> Self {
        self.add_delay = delay;
        self
    }

    /// Exclusive cart access for `session`; hold it until the session is
    /// persisted.
    pub async fn lock(&self, session: &Session) -> Option<CartWriteGuard> {
        self.locks.acquire(session).await
    }

    /// Apply `action` to `cart`.
    ///
    /// # Errors
    ///
    /// Returns `CartSyncError` when the mirror rejects a write; `cart` is
    /// untouched in that case.
    #[instrument(
        skip(self, cart, action, owner),
        fields(kind = action.kind(), mirrored = tracing::field::Empty)
    )]
    pub async fn apply(
        &self,
        cart: &mut Cart,
        action: CartAction,
        owner: Option<&CartOwner>,
    ) -> Result<(), CartSyncError> {
        if matches!(action, CartAction::Add(_)) && !self.add_delay.is_zero() {
            tokio::time::sleep(self.add_delay).await;
        }

        let mut next = cart.clone();
        next.apply(action);

        if let (Some(mirror), Some(owner)) = (&self.mirror, owner) {
            tracing::Span::current().record("mirrored", true);
            for op in mirror_ops(cart, &next) {
                let result = match op {
                    MirrorOp::Upsert {
                        product_id,
                        quantity,
                    } => mirror.upsert_line(owner, product_id, quantity).await,
                    MirrorOp::Delete { product_id } => {
                        mirror.delete_line(owner, product_id).await
                    }
                };
                if let Err(e) = result {
                    tracing::warn!(user_id = %owner.user_id, ?op, "Cart mirror write failed: {e}");
                    return Err(e.into());
                }
            }
        }

        *cart = next;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use medplus_core::Price;

    use super::*;
    use crate::cart::CartProduct;

    #[derive(Default)]
    struct RecordingMirror {
        fail: AtomicBool,
        ops: Mutex<Vec<MirrorOp>>,
    }

    #[async_trait]
    impl CartSync for RecordingMirror {
        async fn upsert_line(
            &self,
            _owner: &CartOwner,
            product_id: ProductId,
            quantity: u32,
        ) -> Result<(), BackendError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(BackendError::Api {
                    status: 503,
                    message: "upstream unavailable".to_string(),
                });
            }
            self.ops.lock().unwrap().push(MirrorOp::Upsert {
                product_id,
                quantity,
            });
            Ok(())
        }

        async fn delete_line(
            &self,
            _owner: &CartOwner,
            product_id: ProductId,
        ) -> Result<(), BackendError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(BackendError::Api {
                    status: 503,
                    message: "upstream unavailable".to_string(),
                });
            }
            self.ops.lock().unwrap().push(MirrorOp::Delete { product_id });
            Ok(())
        }
    }

    fn product(rupees: i64) -> CartProduct {
        CartProduct {
            id: ProductId::random(),
            name: "Amoxicillin 250mg".to_string(),
            brand: "Cipla".to_string(),
            price: Price::from_rupees(rupees),
            image_url: "/static/images/placeholder.svg".to_string(),
            requires_prescription: true,
        }
    }

    fn owner() -> CartOwner {
        CartOwner {
            user_id: UserId::random(),
            access_token: SecretString::from("token"),
        }
    }

    #[tokio::test]
    async fn test_anonymous_cart_is_local_only() {
        let mirror = Arc::new(RecordingMirror::default());
        let service = CartService::new(Some(mirror.clone()));
        let mut cart = Cart::new();

        service
            .apply(&mut cart, CartAction::Add(product(45)), None)
            .await
            .unwrap();

        assert_eq!(cart.item_count(), 1);
        assert!(mirror.ops.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_successful_sync_commits() {
        let mirror = Arc::new(RecordingMirror::default());
        let service = CartService::new(Some(mirror.clone()));
        let owner = owner();
        let item = product(45);
        let mut cart = Cart::new();

        service
            .apply(&mut cart, CartAction::Add(item.clone()), Some(&owner))
            .await
            .unwrap();
        service
            .apply(&mut cart, CartAction::Add(item.clone()), Some(&owner))
            .await
            .unwrap();
        service
            .apply(&mut cart, CartAction::Remove(item.id), Some(&owner))
            .await
            .unwrap();

        assert!(cart.is_empty());
        let ops = mirror.ops.lock().unwrap().clone();
        assert_eq!(
            ops,
            vec![
                MirrorOp::Upsert {
                    product_id: item.id,
                    quantity: 1
                },
                MirrorOp::Upsert {
                    product_id: item.id,
                    quantity: 2
                },
                MirrorOp::Delete {
                    product_id: item.id
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_sync_rolls_back() {
        let mirror = Arc::new(RecordingMirror::default());
        let service = CartService::new(Some(mirror.clone()));
        let owner = owner();
        let mut cart = Cart::new();
        service
            .apply(&mut cart, CartAction::Add(product(180)), Some(&owner))
            .await
            .unwrap();
        let before = cart.clone();

        mirror.fail.store(true, Ordering::SeqCst);
        let err = service
            .apply(&mut cart, CartAction::Add(product(45)), Some(&owner))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Could not update your cart. Please try again.");
        assert_eq!(cart, before);
    }

    #[test]
    fn test_mirror_ops_skip_unchanged_lines() {
        let a = product(10);
        let b = product(20);
        let mut before = Cart::new();
        before.add(a.clone());
        before.add(b.clone());
        let mut after = before.clone();
        after.update_quantity(b.id, 4);

        assert_eq!(
            mirror_ops(&before, &after),
            vec![MirrorOp::Upsert {
                product_id: b.id,
                quantity: 4
            }]
        );

        assert_eq!(
            mirror_ops(&before, &Cart::new()),
            vec![
                MirrorOp::Delete { product_id: a.id },
                MirrorOp::Delete { product_id: b.id },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_add_delay_applies_to_adds_only() {
        let service = CartService::new(None).with_add_delay(Duration::from_millis(500));
        let mut cart = Cart::new();
        let item = product(10);

        let started = tokio::time::Instant::now();
        service
            .apply(&mut cart, CartAction::Add(item.clone()), None)
            .await
            .unwrap();
        assert!(started.elapsed() >= Duration::from_millis(500));

        let started = tokio::time::Instant::now();
        service
            .apply(&mut cart, CartAction::Remove(item.id), None)
            .await
            .unwrap();
        assert!(started.elapsed() < Duration::from_millis(500));
    }
}
