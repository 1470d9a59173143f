//! End-to-end reverse-populate scenarios over the bundled in-memory
//! executor: the category/post/author shapes (many-to-many, one-to-many)
//! and the person/passport shape (one-to-one).

#[cfg(test)]
mod tests {
    use crate::error::RevPopError;
    use crate::memory::MemoryModel;
    use crate::options::PopulateOptions;
    use crate::populate::reverse_populate;
    use crate::populate_utils::{id_match, ids_match};
    use serde_json::{json, Value};

    fn categories() -> Vec<Value> {
        vec![
            json!({"_id": "cat-1", "name": "news"}),
            json!({"_id": "cat-2", "name": "sports"}),
        ]
    }

    fn authors() -> Vec<Value> {
        vec![json!({"_id": "auth-1", "first_name": "ann", "last_name": "ode"})]
    }

    // Five posts, each in both categories, all by the same author.
    fn seeded_posts() -> MemoryModel {
        let posts = MemoryModel::new("posts");
        for i in 0..5 {
            posts
                .insert(json!({
                    "_id": format!("post-{}", i),
                    "title": format!("title-{}", i),
                    "categories": ["cat-1", "cat-2"],
                    "author": "auth-1",
                    "content": format!("content-{}", i),
                }))
                .unwrap();
        }
        posts
    }

    fn category_opts(posts: &MemoryModel) -> PopulateOptions<'_, MemoryModel> {
        PopulateOptions::new()
            .with_model_array(categories())
            .with_store_where("posts")
            .with_array_pop(true)
            .with_model(posts)
            .with_id_field("categories")
    }

    fn author_opts(posts: &MemoryModel) -> PopulateOptions<'_, MemoryModel> {
        PopulateOptions::new()
            .with_model_array(authors())
            .with_store_where("posts")
            .with_array_pop(true)
            .with_model(posts)
            .with_id_field("author")
    }

    #[test]
    fn test_mandatory_field_model_array() {
        let posts = seeded_posts();
        let opts = PopulateOptions::new()
            .with_store_where("posts")
            .with_array_pop(true)
            .with_model(&posts)
            .with_id_field("categories");
        let err = reverse_populate(opts).unwrap_err();
        assert_eq!(err.to_string(), "Missing mandatory field 'model_array'.");
        assert_eq!(posts.find_count(), 0);
    }

    #[test]
    fn test_mandatory_field_store_where() {
        let posts = seeded_posts();
        let opts = PopulateOptions::new()
            .with_model_array(categories())
            .with_array_pop(true)
            .with_model(&posts)
            .with_id_field("categories");
        let err = reverse_populate(opts).unwrap_err();
        assert_eq!(err.to_string(), "Missing mandatory field 'store_where'.");
        assert_eq!(posts.find_count(), 0);
    }

    #[test]
    fn test_mandatory_field_array_pop() {
        let posts = seeded_posts();
        let opts = PopulateOptions::new()
            .with_model_array(categories())
            .with_store_where("posts")
            .with_model(&posts)
            .with_id_field("categories");
        let err = reverse_populate(opts).unwrap_err();
        assert_eq!(err.to_string(), "Missing mandatory field 'array_pop'.");
        assert_eq!(posts.find_count(), 0);
    }

    #[test]
    fn test_mandatory_field_model() {
        let posts = seeded_posts();
        let opts = PopulateOptions::<MemoryModel>::new()
            .with_model_array(categories())
            .with_store_where("posts")
            .with_array_pop(true)
            .with_id_field("categories");
        let err = reverse_populate(opts).unwrap_err();
        assert_eq!(err.to_string(), "Missing mandatory field 'model'.");
        assert_eq!(posts.find_count(), 0);
    }

    #[test]
    fn test_mandatory_field_id_field() {
        let posts = seeded_posts();
        let opts = PopulateOptions::new()
            .with_model_array(categories())
            .with_store_where("posts")
            .with_array_pop(true)
            .with_model(&posts);
        let err = reverse_populate(opts).unwrap_err();
        assert_eq!(err.to_string(), "Missing mandatory field 'id_field'.");
        assert_eq!(posts.find_count(), 0);
    }

    #[test]
    fn test_empty_model_array_short_circuits() {
        let posts = seeded_posts();
        let opts = category_opts(&posts).with_model_array(vec![]);
        let result = reverse_populate(opts).unwrap();
        assert!(result.is_empty());
        assert_eq!(posts.find_count(), 0);
    }

    #[test]
    fn test_bad_query_propagates_error() {
        let posts = seeded_posts();
        // A field-level operator at the top of the filter blows up the query.
        let opts = category_opts(&posts).with_filters(json!({"$ne": "not valid"}));
        let err = reverse_populate(opts).unwrap_err();
        assert!(matches!(err, RevPopError::InvalidQuery(_)));
    }

    #[test]
    fn test_many_to_many() {
        let posts = seeded_posts();
        let result = reverse_populate(category_opts(&posts)).unwrap();

        assert_eq!(result.len(), 2);
        assert!(ids_match(&result, &categories()));
        for category in &result {
            let attached = category["posts"].as_array().unwrap();
            assert_eq!(attached.len(), 5);
            for (i, post) in attached.iter().enumerate() {
                assert!(id_match(post, &json!(format!("post-{}", i))));
            }
        }
    }

    #[test]
    fn test_many_to_many_lean_reaches_the_executor() {
        let posts = seeded_posts();
        let result = reverse_populate(category_opts(&posts).with_lean(true)).unwrap();

        assert_eq!(result.len(), 2);
        for category in &result {
            assert_eq!(category["posts"].as_array().unwrap().len(), 5);
        }
        assert!(posts.last_query().unwrap().lean);
    }

    #[test]
    fn test_one_to_many() {
        let posts = seeded_posts();
        let result = reverse_populate(author_opts(&posts)).unwrap();

        assert_eq!(result.len(), 1);
        assert!(ids_match(&result, &authors()));
        assert_eq!(result[0]["posts"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn test_filters_exclude_matching_records() {
        let posts = seeded_posts();
        let opts = author_opts(&posts).with_filters(json!({"title": {"$ne": "title-0"}}));
        let result = reverse_populate(opts).unwrap();

        let attached = result[0]["posts"].as_array().unwrap();
        assert_eq!(attached.len(), 4);
        for post in attached {
            assert_ne!(post["title"], "title-0");
        }
    }

    #[test]
    fn test_select_keeps_foreign_key_and_id() {
        let posts = seeded_posts();
        let opts = author_opts(&posts).with_select("title");
        let result = reverse_populate(opts).unwrap();

        let attached = result[0]["posts"].as_array().unwrap();
        assert_eq!(attached.len(), 5);
        for post in attached {
            // author is force-included: grouping needs it
            assert!(post.get("author").is_some());
            assert!(post.get("title").is_some());
            assert!(post.get("_id").is_some());
            assert!(post.get("content").is_none());
            assert!(post.get("categories").is_none());
        }
    }

    #[test]
    fn test_sort_orders_attached_results() {
        let posts = MemoryModel::new("posts");
        let titles = ["delta", "alpha", "echo", "bravo", "charlie"];
        for (i, title) in titles.iter().enumerate() {
            posts
                .insert(json!({"_id": i as i64, "title": title, "author": "auth-1"}))
                .unwrap();
        }

        let opts = PopulateOptions::new()
            .with_model_array(authors())
            .with_store_where("posts")
            .with_array_pop(true)
            .with_model(&posts)
            .with_id_field("author")
            .with_sort("title");
        let result = reverse_populate(opts).unwrap();

        let attached: Vec<&str> = result[0]["posts"]
            .as_array()
            .unwrap()
            .iter()
            .map(|post| post["title"].as_str().unwrap())
            .collect();
        let mut expected = titles.to_vec();
        expected.sort_unstable();
        assert_eq!(attached, expected);
    }

    #[test]
    fn test_populate_expands_nested_references() {
        let posts = seeded_posts();
        posts.register_ref("categories", categories());

        let opts = author_opts(&posts).with_populate("categories");
        let result = reverse_populate(opts).unwrap();

        assert!(ids_match(&result, &authors()));
        for post in result[0]["posts"].as_array().unwrap() {
            let expanded = post["categories"].as_array().unwrap();
            assert_eq!(expanded.len(), 2);
            assert!(ids_match(expanded, &categories()));
            assert_eq!(expanded[0]["name"], "news");
        }
    }

    #[test]
    fn test_one_to_one() {
        let persons = vec![
            json!({"_id": "p-1", "first_name": "ada"}),
            json!({"_id": "p-2", "first_name": "bo"}),
        ];
        let passports = MemoryModel::new("passports");
        passports
            .insert(json!({"_id": "pass-1", "number": "N-1", "owner": "p-1"}))
            .unwrap();
        passports
            .insert(json!({"_id": "pass-2", "number": "N-2", "owner": "p-2"}))
            .unwrap();

        let opts = PopulateOptions::new()
            .with_model_array(persons)
            .with_store_where("passport")
            .with_array_pop(false)
            .with_model(&passports)
            .with_id_field("owner");
        let result = reverse_populate(opts).unwrap();

        for person in &result {
            let passport = &person["passport"];
            assert!(passport.is_object());
            // each person carries exactly their own passport
            assert!(id_match(&passport["owner"], &person["_id"]));
        }
        assert_eq!(result[0]["passport"]["number"], "N-1");
        assert_eq!(result[1]["passport"]["number"], "N-2");
    }

    #[test]
    fn test_one_to_one_without_match_is_null() {
        let persons = vec![json!({"_id": "p-9", "first_name": "zed"})];
        let passports = MemoryModel::new("passports");

        let opts = PopulateOptions::new()
            .with_model_array(persons)
            .with_store_where("passport")
            .with_array_pop(false)
            .with_model(&passports)
            .with_id_field("owner");
        let result = reverse_populate(opts).unwrap();
        assert_eq!(result[0]["passport"], Value::Null);
    }

    #[test]
    fn test_one_to_one_ambiguity_keeps_first_match() {
        let persons = vec![json!({"_id": "p-1"})];
        let passports = MemoryModel::new("passports");
        passports
            .insert(json!({"_id": "pass-1", "number": "N-1", "owner": "p-1"}))
            .unwrap();
        passports
            .insert(json!({"_id": "pass-2", "number": "N-2", "owner": "p-1"}))
            .unwrap();

        let opts = PopulateOptions::new()
            .with_model_array(persons)
            .with_store_where("passport")
            .with_array_pop(false)
            .with_model(&passports)
            .with_id_field("owner");
        let result = reverse_populate(opts).unwrap();
        // first match in query order wins; never an error
        assert_eq!(result[0]["passport"]["number"], "N-1");
    }

    #[test]
    fn test_no_match_attaches_empty_array() {
        let posts = MemoryModel::new("posts");
        let result = reverse_populate(category_opts(&posts)).unwrap();
        for category in &result {
            assert_eq!(category["posts"], json!([]));
        }
    }

    #[test]
    fn test_idempotence() {
        let posts = seeded_posts();
        let first = reverse_populate(category_opts(&posts)).unwrap();
        let second = reverse_populate(category_opts(&posts)).unwrap();
        assert_eq!(first, second);
        assert_eq!(posts.find_count(), 2);
    }
}
