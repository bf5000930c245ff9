// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Species Service
//!
//! Create, read and delete species groups. Updates are delegated to the
//! [`RelocateSpeciesUseCase`], which owns every change that can move animals.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Deserializer};
use std::sync::Arc;
use tracing::{debug, info};

use crate::domain::cage::CageId;
use crate::domain::events::SpeciesEvent;
use crate::domain::repository::{CageRepository, SpeciesRepository};
use crate::domain::species::{Diet, NewSpecies, Species, SpeciesChanges, SpeciesId, DEFAULT_QUANTITY};
use crate::domain::validation::ValidationError;
use crate::infrastructure::event_bus::EventBus;

use super::cage_locks::CageLocks;
use super::occupancy::{self, Placement};
use super::relocate_species::RelocateSpeciesUseCase;
use super::{ParkError, ParkResult};

/// Body of `POST /species`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSpeciesRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub diet: Option<Diet>,
    #[serde(default)]
    pub quantity: Option<i64>,
    /// `0` or absent: not housed
    #[serde(default)]
    pub cage_id: Option<i64>,
}

/// Body of `PATCH /species/{id}`.
///
/// Absent fields are left unchanged. `cageId: null` and `cageId: 0` both
/// take the group out of its cage.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSpeciesRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub diet: Option<Diet>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default, deserialize_with = "cage_reference")]
    pub cage_id: Option<Option<CageId>>,
}

/// Only called when the key is present, so the outer `Some` marks "supplied"
fn cage_reference<'de, D>(deserializer: D) -> Result<Option<Option<CageId>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<i64> = Option::deserialize(deserializer)?;
    Ok(Some(raw.filter(|id| *id != 0).map(CageId)))
}

impl From<UpdateSpeciesRequest> for SpeciesChanges {
    fn from(request: UpdateSpeciesRequest) -> Self {
        SpeciesChanges {
            name: request.name,
            diet: request.diet,
            quantity: request.quantity,
            cage_id: request.cage_id,
        }
    }
}

#[async_trait]
pub trait SpeciesService: Send + Sync {
    async fn list_species(&self) -> ParkResult<Vec<Species>>;

    /// Every group whose name matches exactly
    async fn find_species_by_name(&self, name: &str) -> ParkResult<Vec<Species>>;

    async fn create_species(&self, request: CreateSpeciesRequest) -> ParkResult<Species>;

    async fn update_species(&self, id: SpeciesId, request: UpdateSpeciesRequest) -> ParkResult<Species>;

    async fn delete_species(&self, id: SpeciesId) -> ParkResult<()>;
}

pub struct StandardSpeciesService {
    cage_repository: Arc<dyn CageRepository>,
    species_repository: Arc<dyn SpeciesRepository>,
    relocation: Arc<dyn RelocateSpeciesUseCase>,
    cage_locks: CageLocks,
    event_bus: Arc<EventBus>,
}

impl StandardSpeciesService {
    pub fn new(
        cage_repository: Arc<dyn CageRepository>,
        species_repository: Arc<dyn SpeciesRepository>,
        relocation: Arc<dyn RelocateSpeciesUseCase>,
        cage_locks: CageLocks,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            cage_repository,
            species_repository,
            relocation,
            cage_locks,
            event_bus,
        }
    }

    async fn load(&self, id: SpeciesId) -> ParkResult<Species> {
        self.species_repository
            .find_by_id(id)
            .await?
            .ok_or(ParkError::SpeciesNotFound(id))
    }

    async fn recompute(&self, cage_id: CageId) -> ParkResult<()> {
        occupancy::recompute_capacity(
            self.cage_repository.as_ref(),
            self.species_repository.as_ref(),
            &self.event_bus,
            cage_id,
        )
        .await?;
        Ok(())
    }
}

#[async_trait]
impl SpeciesService for StandardSpeciesService {
    async fn list_species(&self) -> ParkResult<Vec<Species>> {
        Ok(self.species_repository.list_all().await?)
    }

    async fn find_species_by_name(&self, name: &str) -> ParkResult<Vec<Species>> {
        Ok(self.species_repository.find_by_name(name).await?)
    }

    async fn create_species(&self, request: CreateSpeciesRequest) -> ParkResult<Species> {
        let diet = request.diet.ok_or(ValidationError::MissingField("diet"))?;
        let cage_id = request.cage_id.filter(|id| *id != 0).map(CageId);
        let new_species = NewSpecies::new(
            request.name,
            diet,
            request.quantity.unwrap_or(DEFAULT_QUANTITY),
            cage_id,
        )?;

        let _guard = self.cage_locks.lock(cage_id).await;
        if let Some(cage_id) = cage_id {
            let placement = Placement { entering: true, growing: false };
            occupancy::check_placement(
                self.cage_repository.as_ref(),
                self.species_repository.as_ref(),
                cage_id,
                &new_species.draft(),
                placement,
            )
            .await?;
        }

        let created = self.species_repository.create(&new_species).await?;
        if let Some(cage_id) = created.cage_id {
            self.recompute(cage_id).await?;
        }

        info!(species_id = %created.id, name = %created.name, cage_id = ?created.cage_id, "Species created");
        self.event_bus.publish_species_event(SpeciesEvent::SpeciesCreated {
            species_id: created.id,
            name: created.name.clone(),
            cage_id: created.cage_id,
            created_at: created.created_at,
        });
        Ok(created)
    }

    async fn update_species(&self, id: SpeciesId, request: UpdateSpeciesRequest) -> ParkResult<Species> {
        self.relocation.relocate(id, request.into()).await
    }

    async fn delete_species(&self, id: SpeciesId) -> ParkResult<()> {
        let mut species = self.load(id).await?;

        let _guard = loop {
            let guard = self.cage_locks.lock(species.cage_id).await;
            let fresh = self.load(id).await?;
            if fresh.cage_id == species.cage_id {
                break guard;
            }
            debug!(species_id = %id, "Species moved while waiting for cage lock, retrying");
            species = fresh;
        };

        self.species_repository.delete(id).await?;
        if let Some(cage_id) = species.cage_id {
            self.recompute(cage_id).await?;
        }

        info!(species_id = %id, cage_id = ?species.cage_id, "Species deleted");
        self.event_bus.publish_species_event(SpeciesEvent::SpeciesDeleted {
            species_id: id,
            cage_id: species.cage_id,
            deleted_at: Utc::now(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::relocate_species::StandardRelocateSpeciesUseCase;
    use crate::domain::cage::{CageStatus, NewCage};
    use crate::infrastructure::repositories::{InMemoryCageRepository, InMemorySpeciesRepository};

    fn service() -> (StandardSpeciesService, Arc<InMemoryCageRepository>) {
        let cages = Arc::new(InMemoryCageRepository::new());
        let species = Arc::new(InMemorySpeciesRepository::new());
        let locks = CageLocks::new();
        let bus = Arc::new(EventBus::default());
        let relocation = Arc::new(StandardRelocateSpeciesUseCase::new(
            cages.clone(),
            species.clone(),
            locks.clone(),
            bus.clone(),
        ));
        let service = StandardSpeciesService::new(cages.clone(), species, relocation, locks, bus);
        (service, cages)
    }

    fn request(name: &str, diet: Diet, quantity: Option<i64>, cage_id: Option<i64>) -> CreateSpeciesRequest {
        CreateSpeciesRequest {
            name: name.to_string(),
            diet: Some(diet),
            quantity,
            cage_id,
        }
    }

    #[test]
    fn test_update_request_cage_reference() {
        let absent: UpdateSpeciesRequest = serde_json::from_str(r#"{"quantity": 2}"#).unwrap();
        assert_eq!(absent.cage_id, None);

        let null: UpdateSpeciesRequest = serde_json::from_str(r#"{"cageId": null}"#).unwrap();
        assert_eq!(null.cage_id, Some(None));

        let zero: UpdateSpeciesRequest = serde_json::from_str(r#"{"cageId": 0}"#).unwrap();
        assert_eq!(zero.cage_id, Some(None));

        let moved: UpdateSpeciesRequest = serde_json::from_str(r#"{"cageId": 3}"#).unwrap();
        assert_eq!(moved.cage_id, Some(Some(CageId(3))));

        // Zero quantity is a real value, not "unset"
        let emptied: UpdateSpeciesRequest = serde_json::from_str(r#"{"quantity": 0}"#).unwrap();
        assert_eq!(SpeciesChanges::from(emptied).quantity, Some(0));
    }

    #[tokio::test]
    async fn test_create_defaults_and_required_fields() {
        let (service, _) = service();

        let created = service
            .create_species(request("Ankylosaurus", Diet::herbivore(), None, Some(0)))
            .await
            .unwrap();
        assert_eq!(created.quantity, DEFAULT_QUANTITY);
        assert_eq!(created.cage_id, None);

        let err = service
            .create_species(CreateSpeciesRequest {
                name: "Ankylosaurus".to_string(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.validation(), Some(&ValidationError::MissingField("diet")));

        let err = service
            .create_species(request("", Diet::herbivore(), None, None))
            .await
            .unwrap_err();
        assert_eq!(err.validation(), Some(&ValidationError::MissingField("name")));
    }

    #[tokio::test]
    async fn test_create_rejects_negative_quantity() {
        let (service, _) = service();
        let err = service
            .create_species(request("Stegosaurus", Diet::herbivore(), Some(-1), None))
            .await
            .unwrap_err();
        assert_eq!(err.validation(), Some(&ValidationError::NegativeQuantity(-1)));
        assert!(service.list_species().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_into_cage_updates_capacity() {
        let (service, cages) = service();
        let pen = cages.create(&NewCage::new(0, 4, CageStatus::Active).unwrap()).await.unwrap();

        service
            .create_species(request("Triceratops", Diet::herbivore(), Some(3), Some(pen.id.0)))
            .await
            .unwrap();
        assert_eq!(cages.find_by_id(pen.id).await.unwrap().unwrap().capacity, 3);

        let err = service
            .create_species(request("Stegosaurus", Diet::herbivore(), Some(2), Some(pen.id.0)))
            .await
            .unwrap_err();
        assert!(matches!(
            err.validation(),
            Some(ValidationError::CapacityExceedsMax { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_recomputes_owning_cage() {
        let (service, cages) = service();
        let pen = cages.create(&NewCage::new(0, 4, CageStatus::Active).unwrap()).await.unwrap();
        let rex = service
            .create_species(request("Tyrannosaurus", Diet::carnivore(), Some(2), Some(pen.id.0)))
            .await
            .unwrap();

        service.delete_species(rex.id).await.unwrap();

        assert_eq!(cages.find_by_id(pen.id).await.unwrap().unwrap().capacity, 0);
        assert!(matches!(
            service.delete_species(rex.id).await,
            Err(ParkError::SpeciesNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_find_by_name_is_exact() {
        let (service, _) = service();
        service
            .create_species(request("Velociraptor", Diet::carnivore(), None, None))
            .await
            .unwrap();

        assert_eq!(service.find_species_by_name("Velociraptor").await.unwrap().len(), 1);
        assert!(service.find_species_by_name("velociraptor").await.unwrap().is_empty());
    }
}
