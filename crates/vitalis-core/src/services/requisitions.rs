//! Administrative requisitions.

use tracing::info;
use validator::Validate;

use super::{require_admin, ServiceError, ServiceResult};
use crate::db::Database;
use crate::models::{
    Principal, Requisition, RequisitionInput, RequisitionPriority, RequisitionStatus,
};

/// Requisition CRUD. Every operation requires an administrator.
pub struct RequisitionService<'a> {
    db: &'a Database,
}

impl<'a> RequisitionService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn create(&self, principal: &Principal, input: RequisitionInput) -> ServiceResult<Requisition> {
        require_admin(principal)?;
        input.validate()?;

        let requisition = Requisition::from_input(input);
        self.db.insert_requisition(&requisition)?;
        info!(requisition_id = %requisition.id, priority = %requisition.priority, "Requisition created");
        Ok(requisition)
    }

    /// All requisitions, newest first.
    pub fn list(&self, principal: &Principal) -> ServiceResult<Vec<Requisition>> {
        require_admin(principal)?;
        Ok(self.db.list_requisitions()?)
    }

    pub fn get(&self, principal: &Principal, id: &str) -> ServiceResult<Requisition> {
        require_admin(principal)?;
        self.find(id)
    }

    pub fn list_by_status(
        &self,
        principal: &Principal,
        status: RequisitionStatus,
    ) -> ServiceResult<Vec<Requisition>> {
        require_admin(principal)?;
        Ok(self.db.list_requisitions_by_status(status)?)
    }

    pub fn list_by_priority(
        &self,
        principal: &Principal,
        priority: RequisitionPriority,
    ) -> ServiceResult<Vec<Requisition>> {
        require_admin(principal)?;
        Ok(self.db.list_requisitions_by_priority(priority)?)
    }

    pub fn update(
        &self,
        principal: &Principal,
        id: &str,
        input: RequisitionInput,
    ) -> ServiceResult<Requisition> {
        require_admin(principal)?;
        input.validate()?;
        let mut requisition = self.find(id)?;

        requisition.apply(input);
        self.db.update_requisition(&requisition)?;
        info!(requisition_id = %requisition.id, "Requisition updated");
        Ok(requisition)
    }

    pub fn update_status(
        &self,
        principal: &Principal,
        id: &str,
        status: RequisitionStatus,
    ) -> ServiceResult<Requisition> {
        require_admin(principal)?;
        let mut requisition = self.find(id)?;

        requisition.status = status;
        requisition.touch();
        self.db.update_requisition(&requisition)?;
        info!(requisition_id = %requisition.id, %status, "Requisition status changed");
        Ok(requisition)
    }

    pub fn delete(&self, principal: &Principal, id: &str) -> ServiceResult<()> {
        require_admin(principal)?;
        if !self.db.delete_requisition(id)? {
            return Err(ServiceError::not_found("requisition", id));
        }
        info!(requisition_id = id, "Requisition deleted");
        Ok(())
    }

    fn find(&self, id: &str) -> ServiceResult<Requisition> {
        self.db
            .get_requisition(id)?
            .ok_or_else(|| ServiceError::not_found("requisition", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::*;

    fn input(title: &str, priority: RequisitionPriority) -> RequisitionInput {
        RequisitionInput {
            title: title.into(),
            description: "Order more gloves".into(),
            status: RequisitionStatus::Pending,
            priority,
            requester: "Nursing".into(),
        }
    }

    #[test]
    fn test_admin_only() {
        let db = setup_db();
        let service = RequisitionService::new(&db);
        let clinic = insert_clinic(&db, "CardioPulse");

        assert!(matches!(
            service.create(&as_clinic(&clinic), input("Gloves", RequisitionPriority::High)),
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            service.list(&as_clinic(&clinic)),
            Err(ServiceError::Forbidden(_))
        ));
    }

    #[test]
    fn test_crud() {
        let db = setup_db();
        let service = RequisitionService::new(&db);
        let admin = admin();

        let created = service
            .create(&admin, input("Gloves", RequisitionPriority::High))
            .unwrap();
        assert_eq!(service.get(&admin, &created.id).unwrap(), created);

        let updated = service
            .update(&admin, &created.id, input("Gloves (L)", RequisitionPriority::Urgent))
            .unwrap();
        assert_eq!(updated.title, "Gloves (L)");
        assert_eq!(updated.created_at, created.created_at);

        let in_progress = service
            .update_status(&admin, &created.id, RequisitionStatus::InProgress)
            .unwrap();
        assert_eq!(in_progress.status, RequisitionStatus::InProgress);
        assert_eq!(
            service
                .list_by_status(&admin, RequisitionStatus::InProgress)
                .unwrap()
                .len(),
            1
        );
        assert_eq!(
            service
                .list_by_priority(&admin, RequisitionPriority::Urgent)
                .unwrap()
                .len(),
            1
        );

        service.delete(&admin, &created.id).unwrap();
        assert!(matches!(
            service.get(&admin, &created.id),
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            service.delete(&admin, &created.id),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn test_validation() {
        let db = setup_db();
        let service = RequisitionService::new(&db);
        let long = "x".repeat(201);
        assert!(matches!(
            service.create(&admin(), input(&long, RequisitionPriority::Low)),
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            service.update(&admin(), "ghost", input("Ok", RequisitionPriority::Low)),
            Err(ServiceError::NotFound(_))
        ));
    }
}
