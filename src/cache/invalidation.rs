//! Which cached views each write makes stale.
//!
//! Every mutation the services perform is listed in [`Mutation`], and
//! [`Mutation::plan`] is an exhaustive match: adding a mutation without
//! deciding its keys does not compile. A key is dropped whenever the write
//! changes anything the view embeds, counters included.

use super::CacheKey;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    RegisterBusiness,
    EditBusiness { business_id: i32 },
    ToggleBusinessOpen { business_id: i32 },
    UpdateBusinessImage { business_id: i32 },
    VerifyBusiness { business_id: i32 },
    ReviewBusinessImage { business_id: i32 },
    DeleteBusiness { business_id: i32 },
    PostReview { business_id: i32 },
    ModerateReview { business_id: i32 },
    RegisterUser,
    EditUser { reviewed_business_ids: Vec<i32> },
    DeleteUser {
        reviewed_business_ids: Vec<i32>,
        favorited_business_ids: Vec<i32>,
    },
    AddFavorite { business_id: i32 },
    RemoveFavorite { business_id: i32 },
    RecordSearch,
    RecordView { business_id: i32 },
    SavePageContent { key: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidationPlan {
    keys: Vec<CacheKey>,
}

impl InvalidationPlan {
    fn new(keys: Vec<CacheKey>) -> Self {
        let mut unique: Vec<CacheKey> = Vec::with_capacity(keys.len());
        for key in keys {
            if !unique.contains(&key) {
                unique.push(key);
            }
        }
        Self { keys: unique }
    }

    #[must_use]
    pub fn keys(&self) -> &[CacheKey] {
        &self.keys
    }

    #[must_use]
    pub fn into_keys(self) -> Vec<CacheKey> {
        self.keys
    }
}

/// Views that embed the stored business record.
fn record_views(id: i32) -> [CacheKey; 4] {
    [
        CacheKey::Business(id),
        CacheKey::ListBusinesses,
        CacheKey::ExportBusinesses,
        CacheKey::ImageBusinesses,
    ]
}

/// Views that embed reviews of a business, with reviewer and business names.
fn review_views(id: i32) -> [CacheKey; 5] {
    [
        CacheKey::Business(id),
        CacheKey::BusinessReviews(id),
        CacheKey::BusinessAnalytics(id),
        CacheKey::VerifiedReviews,
        CacheKey::NonVerifiedReviews,
    ]
}

impl Mutation {
    #[must_use]
    pub fn plan(&self) -> InvalidationPlan {
        use CacheKey as K;

        let keys = match self {
            Self::RegisterBusiness => vec![
                K::ListBusinesses,
                K::ExportBusinesses,
                K::ImageBusinesses,
                K::BusinessCreatedCountByDay,
            ],
            Self::EditBusiness { business_id } => {
                let mut keys = record_views(*business_id).to_vec();
                keys.extend(review_views(*business_id));
                keys.push(K::TopBusinessesByViews);
                keys
            }
            Self::ToggleBusinessOpen { business_id }
            | Self::VerifyBusiness { business_id }
            | Self::UpdateBusinessImage { business_id }
            | Self::ReviewBusinessImage { business_id }
            | Self::AddFavorite { business_id }
            | Self::RemoveFavorite { business_id } => record_views(*business_id).to_vec(),
            Self::DeleteBusiness { business_id } => {
                let mut keys = record_views(*business_id).to_vec();
                keys.extend(review_views(*business_id));
                keys.extend([
                    K::TopBusinessesByViews,
                    K::TotalViewsByDay,
                    K::BusinessCreatedCountByDay,
                ]);
                keys
            }
            Self::PostReview { business_id } => vec![
                K::Business(*business_id),
                K::BusinessReviews(*business_id),
                K::BusinessAnalytics(*business_id),
                K::NonVerifiedReviews,
            ],
            Self::ModerateReview { business_id } => review_views(*business_id).to_vec(),
            Self::RegisterUser => vec![K::Users, K::UserCreatedCountByDay],
            Self::EditUser {
                reviewed_business_ids,
            } => {
                let mut keys = vec![K::Users, K::VerifiedReviews, K::NonVerifiedReviews];
                for id in reviewed_business_ids {
                    keys.extend([K::Business(*id), K::BusinessReviews(*id)]);
                }
                keys
            }
            Self::DeleteUser {
                reviewed_business_ids,
                favorited_business_ids,
            } => {
                let mut keys = vec![
                    K::Users,
                    K::UserCreatedCountByDay,
                    K::VerifiedReviews,
                    K::NonVerifiedReviews,
                ];
                for id in reviewed_business_ids {
                    keys.extend(review_views(*id));
                }
                for id in favorited_business_ids {
                    keys.extend(record_views(*id));
                }
                keys
            }
            Self::RecordSearch => vec![K::TopItems, K::TopLocations],
            Self::RecordView { business_id } => vec![
                K::BusinessAnalytics(*business_id),
                K::ExportBusinesses,
                K::TotalViewsByDay,
                K::TopBusinessesByViews,
            ],
            Self::SavePageContent { key } => vec![K::PageContent(key.clone())],
        };

        InvalidationPlan::new(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_mutations() -> Vec<Mutation> {
        vec![
            Mutation::RegisterBusiness,
            Mutation::EditBusiness { business_id: 1 },
            Mutation::ToggleBusinessOpen { business_id: 1 },
            Mutation::UpdateBusinessImage { business_id: 1 },
            Mutation::VerifyBusiness { business_id: 1 },
            Mutation::ReviewBusinessImage { business_id: 1 },
            Mutation::DeleteBusiness { business_id: 1 },
            Mutation::PostReview { business_id: 1 },
            Mutation::ModerateReview { business_id: 1 },
            Mutation::RegisterUser,
            Mutation::EditUser {
                reviewed_business_ids: vec![1],
            },
            Mutation::DeleteUser {
                reviewed_business_ids: vec![1, 2],
                favorited_business_ids: vec![3],
            },
            Mutation::AddFavorite { business_id: 1 },
            Mutation::RemoveFavorite { business_id: 1 },
            Mutation::RecordSearch,
            Mutation::RecordView { business_id: 1 },
            Mutation::SavePageContent {
                key: "about".to_string(),
            },
        ]
    }

    fn drops(mutation: &Mutation, key: &CacheKey) -> bool {
        mutation.plan().keys().contains(key)
    }

    #[test]
    fn test_every_mutation_drops_something() {
        for mutation in all_mutations() {
            assert!(
                !mutation.plan().keys().is_empty(),
                "{mutation:?} invalidates nothing"
            );
        }
    }

    #[test]
    fn test_plans_have_no_duplicates() {
        let plan = Mutation::DeleteUser {
            reviewed_business_ids: vec![4, 4],
            favorited_business_ids: vec![4],
        }
        .plan();
        let keys = plan.keys();
        for (i, key) in keys.iter().enumerate() {
            assert!(!keys[i + 1..].contains(key), "{key} listed twice");
        }
    }

    #[test]
    fn test_record_changes_drop_every_record_view() {
        for mutation in [
            Mutation::EditBusiness { business_id: 4 },
            Mutation::ToggleBusinessOpen { business_id: 4 },
            Mutation::VerifyBusiness { business_id: 4 },
            Mutation::UpdateBusinessImage { business_id: 4 },
            Mutation::ReviewBusinessImage { business_id: 4 },
            Mutation::AddFavorite { business_id: 4 },
            Mutation::RemoveFavorite { business_id: 4 },
            Mutation::DeleteBusiness { business_id: 4 },
        ] {
            for key in record_views(4) {
                assert!(drops(&mutation, &key), "{mutation:?} keeps {key}");
            }
            assert!(!drops(&mutation, &CacheKey::Business(5)));
        }
    }

    #[test]
    fn test_review_post_drops_business_and_queue() {
        let mutation = Mutation::PostReview { business_id: 7 };
        assert!(drops(&mutation, &CacheKey::Business(7)));
        assert!(drops(&mutation, &CacheKey::NonVerifiedReviews));
        assert!(!drops(&mutation, &CacheKey::Users));
    }

    #[test]
    fn test_moderation_drops_both_review_lists() {
        let mutation = Mutation::ModerateReview { business_id: 3 };
        assert!(drops(&mutation, &CacheKey::VerifiedReviews));
        assert!(drops(&mutation, &CacheKey::NonVerifiedReviews));
        assert!(drops(&mutation, &CacheKey::Business(3)));
    }

    #[test]
    fn test_business_rename_drops_review_lists() {
        let mutation = Mutation::EditBusiness { business_id: 4 };
        assert!(drops(&mutation, &CacheKey::BusinessReviews(4)));
        assert!(drops(&mutation, &CacheKey::VerifiedReviews));
        assert!(drops(&mutation, &CacheKey::NonVerifiedReviews));
        assert!(drops(&mutation, &CacheKey::TopBusinessesByViews));
    }

    #[test]
    fn test_new_business_can_appear_in_pending_images() {
        assert!(drops(&Mutation::RegisterBusiness, &CacheKey::ImageBusinesses));
    }

    #[test]
    fn test_user_delete_drops_reviewed_and_favorited_businesses() {
        let mutation = Mutation::DeleteUser {
            reviewed_business_ids: vec![5, 6],
            favorited_business_ids: vec![8],
        };
        assert!(drops(&mutation, &CacheKey::Business(5)));
        assert!(drops(&mutation, &CacheKey::BusinessReviews(6)));
        assert!(drops(&mutation, &CacheKey::Business(8)));
        assert!(drops(&mutation, &CacheKey::ListBusinesses));
        assert!(drops(&mutation, &CacheKey::Users));
    }

    #[test]
    fn test_user_edit_drops_reviewer_names() {
        let mutation = Mutation::EditUser {
            reviewed_business_ids: vec![2],
        };
        assert!(drops(&mutation, &CacheKey::Users));
        assert!(drops(&mutation, &CacheKey::Business(2)));
        assert!(drops(&mutation, &CacheKey::BusinessReviews(2)));
        assert!(drops(&mutation, &CacheKey::VerifiedReviews));
    }

    #[test]
    fn test_counters_drop_their_aggregates() {
        let search = Mutation::RecordSearch;
        assert!(drops(&search, &CacheKey::TopItems));
        assert!(drops(&search, &CacheKey::TopLocations));

        let view = Mutation::RecordView { business_id: 1 };
        assert!(drops(&view, &CacheKey::BusinessAnalytics(1)));
        assert!(drops(&view, &CacheKey::ExportBusinesses));
        assert!(drops(&view, &CacheKey::TotalViewsByDay));
        assert!(drops(&view, &CacheKey::TopBusinessesByViews));
        assert!(!drops(&view, &CacheKey::Business(1)));
    }

    #[test]
    fn test_page_save_drops_its_key_only() {
        let mutation = Mutation::SavePageContent {
            key: "about".to_string(),
        };
        assert_eq!(
            mutation.plan().keys(),
            &[CacheKey::PageContent("about".to_string())]
        );
    }
}
