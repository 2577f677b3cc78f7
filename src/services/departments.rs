//! Department registry service

use crate::{
    error::AppResult,
    models::department::{CreateDepartment, Department, UpdateDepartment},
    policy::{authorize, Action, Actor},
    repository::Repository,
};

#[derive(Clone)]
pub struct DepartmentsService {
    repository: Repository,
}

impl DepartmentsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<Department>> {
        self.repository.departments.list().await
    }

    pub async fn get(&self, id: i32) -> AppResult<Department> {
        self.repository.departments.get_by_id(id).await
    }

    pub async fn create(&self, actor: &Actor, data: &CreateDepartment) -> AppResult<Department> {
        authorize(actor, Action::ManageInventory)?;
        let department = self.repository.departments.create(data).await?;
        tracing::info!(department_id = department.id, "Department created: {}", department.name);
        Ok(department)
    }

    pub async fn update(&self, actor: &Actor, id: i32, data: &UpdateDepartment) -> AppResult<Department> {
        authorize(actor, Action::ManageInventory)?;
        self.repository.departments.update(id, data).await
    }

    pub async fn delete(&self, actor: &Actor, id: i32) -> AppResult<()> {
        authorize(actor, Action::ManageInventory)?;
        self.repository.departments.delete(id).await?;
        tracing::info!(department_id = id, "Department deleted");
        Ok(())
    }
}
