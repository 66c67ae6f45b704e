use crate::core::client::ApiClient;
use crate::domain::builder::DataBuilder;
use crate::domain::model::{ApiMessage, Pet, PetStatus, User};
use crate::utils::error::{HarnessError, Result};

#[derive(Debug, Clone)]
pub struct PetLifecycle {
    pub created: Pet,
    pub updated: Pet,
    pub fetched: Pet,
}

#[derive(Debug, Clone)]
pub struct UserLifecycle {
    pub created: ApiMessage,
    pub login: ApiMessage,
    pub fetched: User,
}

/// Create the builder's pet, mark it sold, read it back and delete it.
pub async fn pet_lifecycle(client: &ApiClient, builder: DataBuilder) -> Result<PetLifecycle> {
    let pet = builder.build_pet();
    tracing::info!("🐾 Creating pet '{}' ({})", pet.name, pet.status);
    let created: Pet = client.post("/pet", &pet).await?;

    let id = created.id.ok_or_else(|| HarnessError::Scenario {
        message: format!("created pet '{}' came back without an id", created.name),
    })?;

    let update = builder
        .with_pet_id(id)
        .update_pet_status(PetStatus::Sold)
        .build_pet();
    tracing::info!("🐾 Updating pet {} to {}", id, update.status);
    let updated: Pet = client.put("/pet", &update).await?;

    let fetched: Pet = client.get(&format!("/pet/{}", id), &[]).await?;

    tracing::info!("🐾 Deleting pet {}", id);
    client.delete(&format!("/pet/{}", id)).await?;

    Ok(PetLifecycle {
        created,
        updated,
        fetched,
    })
}

/// Register the builder's user, log in with it, read it back and delete it.
pub async fn user_lifecycle(client: &ApiClient, builder: DataBuilder) -> Result<UserLifecycle> {
    let user = builder.build_user();
    tracing::info!("👤 Creating user '{}'", user.username);
    let created: ApiMessage = client.post("/user", &user).await?;

    let login: ApiMessage = client
        .get(
            "/user/login",
            &[
                ("username", user.username.as_str()),
                ("password", user.password.as_str()),
            ],
        )
        .await?;

    let user_path = format!("/user/{}", user.username);
    let fetched: User = client.get(&user_path, &[]).await?;

    tracing::info!("👤 Deleting user '{}'", user.username);
    client.delete(&user_path).await?;

    Ok(UserLifecycle {
        created,
        login,
        fetched,
    })
}

pub async fn find_pets_by_status(client: &ApiClient, status: PetStatus) -> Result<Vec<Pet>> {
    let pets: Vec<Pet> = client
        .get("/pet/findByStatus", &[("status", status.as_str())])
        .await?;
    tracing::info!("🔎 Found {} pets with status {}", pets.len(), status);
    Ok(pets)
}
