// Normalizing a small chat model: one write, one rename, one stale read

use std::{collections::HashMap, rc::Rc};

use entity_normalizer::Entity;

#[entity_normalizer::entity_module]
pub mod chat {
    pub mod user {
        #[entity_spec(name = "user")]
        #[derive(Eq, Hash)]
        pub struct UserSpec {
            #[entity_id]
            user_id: i64,
            name: String,
        }
    }

    pub mod channel {
        use std::collections::HashMap;

        use super::user::User;

        #[entity_spec(name = "channel")]
        pub struct ChannelSpec {
            #[entity_id]
            slug: String,
            owner: User,
            members: Vec<User>,
            unread: HashMap<User, u32>,
        }
    }
}

use chat::{
    channel::Channel,
    store::{NormalizedEntityRepository, NormalizedEntityRepositoryReader, NormalizedEntityRepositoryWriter},
    user::User,
};

fn main() {
    env_logger::init();

    let ada = User::new(1, "Ada".to_string());
    let brian = User::new(2, "Brian".to_string());
    let general = Channel::new(
        "general".to_string(),
        ada.clone(),
        vec![ada.clone(), brian.clone()],
        HashMap::from([(brian.clone(), 3)]),
    );

    let mut repository = NormalizedEntityRepository::default();
    let dirty = repository.put_channel(general);
    println!("put_channel stored {} entities:", dirty.len());
    for entity in &dirty {
        println!("  - {}", entity.entity_type());
    }

    let before = repository.get_channel(&"general".to_string()).expect("channel was stored");

    repository.put_user(User::new(1, "Ada Lovelace".to_string()));
    let after = repository.get_channel(&"general".to_string()).expect("channel was stored");

    println!("owner before rename: {}", before.owner().name());
    println!("owner after rename:  {}", after.owner().name());
    println!("rebuilt on read:     {}", !Rc::ptr_eq(&before, &after));
    println!(
        "members:             {:?}",
        after.members().iter().map(|member| member.name().as_str()).collect::<Vec<_>>()
    );
    println!("channel id:          {}", after.id());
}
