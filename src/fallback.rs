//! Built-in content served when the CMS cannot be reached.

use crate::data::{Author, Category, ContentId, ContentItem, ReadingTime, Resource, ResourceKind};
use crate::mapping::parse_timestamp;

struct Sample {
    id: u64,
    slug: &'static str,
    title: &'static str,
    excerpt: &'static str,
    content: &'static str,
    date: &'static str,
    category: Category,
    ranking: u8,
    minutes: u32,
    tags: &'static [&'static str],
}

const SAMPLES: [Sample; 4] = [
    Sample {
        id: 1,
        slug: "introduccion-react",
        title: "Introducción a React",
        excerpt: "Aprende los fundamentos de React desde cero",
        content: "<p>Una guía completa para empezar con React...</p>",
        date: "2024-01-15T10:00:00",
        category: Category::Frontend,
        ranking: 3,
        minutes: 8,
        tags: &["react", "javascript", "frontend"],
    },
    Sample {
        id: 2,
        slug: "introduccion-react-hooks-guia-completa",
        title: "Introducción a React Hooks: Una Guía Completa",
        excerpt: "Descubre cómo los React Hooks han revolucionado el desarrollo de componentes funcionales.",
        content: "<p>Los React Hooks son una característica fundamental del desarrollo moderno con React...</p>",
        date: "2025-05-28T10:00:00",
        category: Category::Frontend,
        ranking: 2,
        minutes: 1,
        tags: &["react", "hooks"],
    },
    Sample {
        id: 3,
        slug: "docker-desarrolladores-containerizacion",
        title: "Docker para Desarrolladores: Containerización Simplificada",
        excerpt: "Aprende los fundamentos de Docker y cómo puede cambiar tu flujo de trabajo de despliegue.",
        content: "<p>Docker ha transformado la manera en que desarrollamos y desplegamos aplicaciones...</p>",
        date: "2025-05-27T15:30:00",
        category: Category::Devops,
        ranking: 2,
        minutes: 1,
        tags: &["docker"],
    },
    Sample {
        id: 4,
        slug: "nodejs-express-apis-rest-modernas",
        title: "Node.js y Express: Construyendo APIs REST Modernas",
        excerpt: "Domina la creación de APIs robustas y escalables con Node.js y Express.",
        content: "<p>Node.js y Express forman una combinación poderosa para el desarrollo backend...</p>",
        date: "2025-05-26T09:15:00",
        category: Category::Backend,
        ranking: 2,
        minutes: 1,
        tags: &["nodejs", "express", "api"],
    },
];

/// Items listed while the CMS is offline. Fresh on every call, never cached.
pub fn sample_items() -> Vec<ContentItem> {
    SAMPLES.iter().map(to_item).collect()
}

fn to_item(s: &Sample) -> ContentItem {
    let (prerequisites, objectives, resources) = if s.id == 1 {
        (
            vec!["Conocimientos básicos de JavaScript".to_string(), "HTML y CSS".to_string()],
            vec![
                "Entender qué es React".to_string(),
                "Crear tu primer componente".to_string(),
                "Manejar props y state".to_string(),
            ],
            vec![Resource {
                title: "Documentación oficial de React".to_string(),
                url: "https://react.dev".to_string(),
                kind: ResourceKind::Documentation,
            }],
        )
    } else {
        (Vec::new(), Vec::new(), Vec::new())
    };
    ContentItem {
        id: ContentId::Num(s.id),
        slug: s.slug.to_string(),
        title: s.title.to_string(),
        excerpt_html: s.excerpt.to_string(),
        content_html: s.content.to_string(),
        published_at: parse_timestamp(s.date),
        modified_at: parse_timestamp(s.date),
        hero_image_url: None,
        ranking: s.ranking,
        reading_time: ReadingTime { minutes: s.minutes },
        author: Author::default(),
        category: s.category,
        tags: s.tags.iter().map(|t| t.to_string()).collect(),
        prerequisites,
        objectives,
        resources,
        attachments: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn samples_are_well_formed() {
        let items = sample_items();
        let slugs: HashSet<&str> = items.iter().map(|i| i.slug.as_str()).collect();
        assert_eq!(slugs.len(), items.len());
        for item in &items {
            assert!((1..=5).contains(&item.ranking), "{}", item.slug);
            assert!(item.published_at.is_some(), "{}", item.slug);
        }
        assert_eq!(items[0].reading_time.to_string(), "8 min");
        assert_eq!(items[0].resources[0].kind, ResourceKind::Documentation);
    }
}
