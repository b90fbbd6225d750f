// Shared messaging model and fixtures
#![allow(dead_code)]

use std::collections::HashMap;

#[entity_normalizer::entity_module]
pub mod model {
    pub mod user {
        #[entity_spec(name = "user")]
        #[derive(Eq, Hash)]
        pub struct UserSpec {
            #[entity_id]
            user_id: i64,
            name: String,
        }
    }

    pub mod device {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum DeviceType {
            Android,
            Ios,
            Windows,
        }

        #[entity_spec(name = "device")]
        #[derive(Eq, Hash)]
        pub struct DeviceSpec {
            #[entity_id]
            device_type: DeviceType,
        }
    }

    pub mod message {
        use std::collections::HashMap;

        use super::{device::Device, user::User};

        #[entity_spec(name = "message")]
        pub struct MessageSpec {
            #[entity_id]
            message_id: i64,
            body: String,
            sender: User,
            recipients: Vec<User>,
            recipients_to_read_list: Vec<HashMap<User, bool>>,
            users_by_devices: HashMap<Vec<Device>, Vec<User>>,
        }
    }
}

#[allow(unused_imports)]
pub use model::{
    device::{Device, DeviceType},
    message::Message,
    store::{
        EntityRef, EntityStoreReader, EntityStoreWriter, InMemoryEntityStore, NormalizedEntityRepository,
        NormalizedEntityRepositoryReader, NormalizedEntityRepositoryWriter,
    },
    user::User,
};

pub const MESSAGE_ID: i64 = 1;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn ozzy() -> User {
    User::new(1, "Ozzy".to_string())
}

/// Same id as [`ozzy`], different name
pub fn ozzy_renamed() -> User {
    User::new(1, "Ozzy Osbourne".to_string())
}

pub fn fozzy() -> User {
    User::new(2, "Fozzy".to_string())
}

pub fn gozzy() -> User {
    User::new(3, "Gozzy".to_string())
}

pub fn android() -> Device {
    Device::new(DeviceType::Android)
}

pub fn ios() -> Device {
    Device::new(DeviceType::Ios)
}

pub fn windows() -> Device {
    Device::new(DeviceType::Windows)
}

pub fn message() -> Message {
    Message::new(
        MESSAGE_ID,
        "Hello World".to_string(),
        ozzy(),
        vec![fozzy(), gozzy()],
        vec![HashMap::from([(fozzy(), true)]), HashMap::from([(gozzy(), false)])],
        HashMap::from([
            (vec![android(), ios()], vec![ozzy(), fozzy()]),
            (vec![windows()], vec![gozzy()]),
        ]),
    )
}

pub fn repository() -> NormalizedEntityRepository {
    init_logger();
    NormalizedEntityRepository::default()
}
