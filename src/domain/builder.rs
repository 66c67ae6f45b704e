use crate::domain::model::{Pet, PetStatus, User};
use rand::distributions::Alphanumeric;
use rand::seq::SliceRandom;
use rand::Rng;

const FIRST_NAMES: &[&str] = &[
    "Bella", "Max", "Luna", "Charlie", "Lucy", "Cooper", "Daisy", "Milo", "Sadie", "Oliver",
    "Molly", "Rocky", "Zoe", "Teddy", "Nala", "Bailey", "Rosie", "Oscar", "Ruby", "Toby",
];

/// Fluent builder for test data.
///
/// Starts from a randomly named `available` pet and a random user; every
/// `with_*` call replaces the corresponding value with exactly what it is given.
#[derive(Debug, Clone)]
pub struct DataBuilder {
    pet: Pet,
    user: User,
}

impl Default for DataBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DataBuilder {
    pub fn new() -> Self {
        let mut rng = rand::thread_rng();

        let name = FIRST_NAMES
            .choose(&mut rng)
            .copied()
            .unwrap_or("Buddy")
            .to_string();
        let username = format!("{}_{}", name.to_lowercase(), rng.gen_range(1000..100_000));

        Self {
            pet: Pet {
                id: None,
                name,
                status: PetStatus::Available,
            },
            user: User {
                username,
                password: random_token(&mut rng, 16),
            },
        }
    }

    pub fn with_pet(mut self, name: impl Into<String>, status: PetStatus) -> Self {
        self.pet = Pet {
            id: None,
            name: name.into(),
            status,
        };
        self
    }

    pub fn with_pet_id(mut self, id: i64) -> Self {
        self.pet.id = Some(id);
        self
    }

    pub fn update_pet_status(mut self, status: PetStatus) -> Self {
        self.pet.status = status;
        self
    }

    pub fn build_pet(&self) -> Pet {
        self.pet.clone()
    }

    pub fn with_user(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = User {
            username: username.into(),
            password: password.into(),
        };
        self
    }

    pub fn build_user(&self) -> User {
        self.user.clone()
    }
}

fn random_token<R: Rng>(rng: &mut R, len: usize) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
