//! Per-recipe rating aggregates and the local user's own ratings.
//!
//! The local user contributes at most one rating per recipe. Re-rating
//! replaces that contribution in the running sum without growing
//! `total_ratings`, so submitting the same value twice changes nothing.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use foodiesnap_core::kv::keys;
use foodiesnap_core::{Error, KeyValueStore, RecipeId, Result};

use crate::persist::{load_json, remove_key, write_through};

pub const MIN_STARS: u8 = 1;
pub const MAX_STARS: u8 = 5;

/// Persisted aggregate for one recipe. `user_rating` is 0 for a baseline
/// the local user has not contributed to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingAggregate {
    pub recipe_id: RecipeId,
    pub user_rating: u8,
    pub average_rating: f64,
    pub total_ratings: u32,
    /// Milliseconds since the Unix epoch of the last write.
    pub timestamp: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatingState {
    pub ratings: BTreeMap<RecipeId, RatingAggregate>,
    pub user_ratings: BTreeMap<RecipeId, u8>,
}

/// Read view of one recipe's rating; all zero when unrated.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RatingSummary {
    pub average: f64,
    pub total: u32,
    pub user_rating: u8,
}

fn round_one_decimal(x: f64) -> f64 { (x * 10.0).round() / 10.0 }

impl RatingState {
    /// Folds the local user's `stars` for `recipe_id` into the aggregate.
    pub fn apply(&mut self, recipe_id: RecipeId, stars: u8, timestamp: i64) -> &RatingAggregate {
        let (old_average, old_total) =
            self.ratings.get(&recipe_id).map_or((0.0, 0), |a| (a.average_rating, a.total_ratings));
        let prior_sum = old_average * f64::from(old_total);

        let (sum, total) = match self.user_ratings.get(&recipe_id) {
            Some(&previous) => (prior_sum - f64::from(previous) + f64::from(stars), old_total),
            None => (prior_sum + f64::from(stars), old_total + 1),
        };
        let average_rating = if total > 0 { round_one_decimal(sum / f64::from(total)) } else { 0.0 };

        self.user_ratings.insert(recipe_id, stars);
        let aggregate = RatingAggregate { recipe_id, user_rating: stars, average_rating, total_ratings: total, timestamp };
        self.ratings.insert(recipe_id, aggregate);
        &self.ratings[&recipe_id]
    }

    pub fn summary(&self, recipe_id: RecipeId) -> RatingSummary {
        let aggregate = self.ratings.get(&recipe_id);
        RatingSummary {
            average: aggregate.map_or(0.0, |a| a.average_rating),
            total: aggregate.map_or(0, |a| a.total_ratings),
            user_rating: self.user_ratings.get(&recipe_id).copied().unwrap_or(0),
        }
    }

    /// Rebuilds state from persisted maps by replaying each aggregate with
    /// the user's own rating. Replay is idempotent, so the result matches
    /// what was persisted, timestamps included.
    pub fn replay(ratings: BTreeMap<RecipeId, RatingAggregate>, user_ratings: BTreeMap<RecipeId, u8>) -> Self {
        let mut user_ratings = user_ratings;
        user_ratings.retain(|id, _| ratings.contains_key(id));
        let mut state = Self { ratings, user_ratings };
        let ids: Vec<RecipeId> = state.ratings.keys().copied().collect();
        for id in ids {
            let Some(aggregate) = state.ratings.get(&id) else { continue };
            let timestamp = aggregate.timestamp;
            let own = state.user_ratings.get(&id).copied().unwrap_or(aggregate.user_rating);
            if !(MIN_STARS..=MAX_STARS).contains(&own) {
                // baseline only: nothing of ours to fold in
                state.user_ratings.remove(&id);
                continue;
            }
            state.user_ratings.insert(id, own);
            state.apply(id, own, timestamp);
        }
        state
    }

    /// Rated ids, best average first; ties go to more ratings, then lower id.
    pub fn top_rated(&self, limit: usize) -> Vec<RecipeId> {
        let mut ranked: Vec<&RatingAggregate> = self.ratings.values().collect();
        ranked.sort_by(|a, b| {
            b.average_rating
                .partial_cmp(&a.average_rating)
                .unwrap_or(Ordering::Equal)
                .then(b.total_ratings.cmp(&a.total_ratings))
                .then(a.recipe_id.cmp(&b.recipe_id))
        });
        ranked.into_iter().take(limit).map(|a| a.recipe_id).collect()
    }
}

pub struct RatingStore {
    kv: Arc<dyn KeyValueStore>,
    state: watch::Sender<RatingState>,
}

impl RatingStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        let (state, _) = watch::channel(RatingState::default());
        Self { kv, state }
    }

    pub fn open(kv: Arc<dyn KeyValueStore>) -> Self {
        let store = Self::new(kv);
        store.hydrate();
        store
    }

    /// Loads both persisted maps. Unreadable data is logged and treated as empty.
    pub fn hydrate(&self) {
        let loaded = load_json::<BTreeMap<RecipeId, RatingAggregate>>(self.kv.as_ref(), keys::RATINGS).and_then(
            |ratings| {
                let user = load_json::<BTreeMap<RecipeId, u8>>(self.kv.as_ref(), keys::USER_RATINGS)?;
                Ok((ratings.unwrap_or_default(), user.unwrap_or_default()))
            },
        );
        let state = match loaded {
            Ok((ratings, user_ratings)) => RatingState::replay(ratings, user_ratings),
            Err(e) => {
                warn!(error = %e, "failed to load ratings; starting empty");
                RatingState::default()
            }
        };
        debug!(rated = state.ratings.len(), "ratings hydrated");
        self.state.send_replace(state);
    }

    pub fn subscribe(&self) -> watch::Receiver<RatingState> { self.state.subscribe() }

    pub fn snapshot(&self) -> RatingState { self.state.borrow().clone() }

    /// Submits the local user's rating. Rejects stars outside 1..=5.
    pub fn rate(&self, recipe_id: RecipeId, stars: u8) -> Result<RatingSummary> {
        if !(MIN_STARS..=MAX_STARS).contains(&stars) {
            return Err(Error::InvalidRating(stars));
        }
        let now = Utc::now().timestamp_millis();
        self.state.send_modify(|s| {
            let aggregate = s.apply(recipe_id, stars, now);
            info!(recipe_id, stars, average = aggregate.average_rating, total = aggregate.total_ratings, "rated");
        });
        self.persist();
        Ok(self.aggregate(recipe_id))
    }

    pub fn aggregate(&self, recipe_id: RecipeId) -> RatingSummary { self.state.borrow().summary(recipe_id) }

    /// Installs ratings submitted by other users. Never overwrites an
    /// existing aggregate; returns whether the baseline was installed.
    pub fn seed_baseline(&self, recipe_id: RecipeId, average: f64, total: u32) -> bool {
        let seeded = self.state.send_if_modified(|s| {
            if total == 0 || s.ratings.contains_key(&recipe_id) {
                return false;
            }
            s.ratings.insert(
                recipe_id,
                RatingAggregate {
                    recipe_id,
                    user_rating: 0,
                    average_rating: round_one_decimal(average),
                    total_ratings: total,
                    timestamp: Utc::now().timestamp_millis(),
                },
            );
            true
        });
        if seeded {
            self.persist();
        }
        seeded
    }

    pub fn top_rated(&self, limit: usize) -> Vec<RecipeId> { self.state.borrow().top_rated(limit) }

    pub fn clear_all(&self) {
        self.state.send_replace(RatingState::default());
        remove_key(self.kv.as_ref(), keys::RATINGS);
        remove_key(self.kv.as_ref(), keys::USER_RATINGS);
        info!("cleared ratings");
    }

    fn persist(&self) {
        let state = self.state.borrow();
        write_through(self.kv.as_ref(), keys::RATINGS, &state.ratings);
        write_through(self.kv.as_ref(), keys::USER_RATINGS, &state.user_ratings);
    }
}
