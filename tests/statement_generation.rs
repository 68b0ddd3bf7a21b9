use crudgen::{
    Dialect, EntityDescriptor, Params, PropertyDescriptor, SortOrder, SqlType,
    StatementGenerator, StatementName, ValueKind,
};
use serde_json::json;

fn user() -> EntityDescriptor {
    EntityDescriptor::builder("User", "ds_user")
        .id(PropertyDescriptor::new("id", SqlType::BigInt, ValueKind::Numeric))
        .property(PropertyDescriptor::new(
            "userName",
            SqlType::VarChar,
            ValueKind::String,
        ))
        .property(PropertyDescriptor::new(
            "age",
            SqlType::Integer,
            ValueKind::Numeric,
        ))
        .build()
}

fn versioned_user() -> EntityDescriptor {
    EntityDescriptor::builder("User", "ds_user")
        .id(PropertyDescriptor::new("id", SqlType::BigInt, ValueKind::Numeric))
        .property(PropertyDescriptor::new(
            "userName",
            SqlType::VarChar,
            ValueKind::String,
        ))
        .property(
            PropertyDescriptor::new("version", SqlType::Integer, ValueKind::Numeric).version(),
        )
        .build()
}

fn rendered(dialect: Dialect, entity: &EntityDescriptor, name: StatementName) -> String {
    rendered_with(dialect, entity, name, &Params::new())
}

fn rendered_with(
    dialect: Dialect,
    entity: &EntityDescriptor,
    name: StatementName,
    params: &Params,
) -> String {
    StatementGenerator::new(dialect)
        .generate(entity)
        .get(name)
        .expect("statement should be generated")
        .render(params)
}

#[test]
fn insert_lists_columns_and_placeholders() {
    assert_eq!(
        rendered(Dialect::h2(), &user(), StatementName::Insert),
        "insert into ds_user(id,user_name,age) values(#{id},#{userName},#{age})"
    );
}

#[test]
fn find_by_id_selects_aliased_columns() {
    assert_eq!(
        rendered(Dialect::h2(), &user(), StatementName::FindById),
        "select \"User\".id as \"id\",\"User\".user_name as \"userName\",\"User\".age as \"age\" \
         from ds_user \"User\" where \"User\".id=#{id}"
    );
}

#[test]
fn update_sets_every_non_id_column() {
    assert_eq!(
        rendered(Dialect::h2(), &user(), StatementName::Update),
        "update ds_user set user_name=#{userName},age=#{age} where id=#{id}"
    );
}

#[test]
fn update_ignore_null_only_sets_present_parameters() {
    let params = Params::new().value("age", 30);
    assert_eq!(
        rendered_with(Dialect::h2(), &user(), StatementName::UpdateIgnoreNull, &params),
        "update ds_user set age=#{age} where id=#{id}"
    );
}

#[test]
fn version_column_increments_and_guards() {
    assert_eq!(
        rendered(Dialect::h2(), &versioned_user(), StatementName::Update),
        "update ds_user set user_name=#{userName},version=version+1 \
         where id=#{id} and version=#{version}"
    );
}

#[test]
fn find_all_is_plain_without_augmentations() {
    assert_eq!(
        rendered(Dialect::h2(), &user(), StatementName::FindAll),
        "select \"User\".id as \"id\",\"User\".user_name as \"userName\",\"User\".age as \"age\" \
         from ds_user \"User\""
    );
}

#[test]
fn find_all_composes_ids_and_sorts() {
    let params = Params::new()
        .ids(vec![json!(1), json!(2)])
        .sorts(vec![SortOrder::desc("userName")]);
    assert_eq!(
        rendered_with(Dialect::h2(), &user(), StatementName::FindAll, &params),
        "select \"User\".id as \"id\",\"User\".user_name as \"userName\",\"User\".age as \"age\" \
         from ds_user \"User\" where \"User\".id in (#{_ids[0]},#{_ids[1]}) \
         order by \"User\".user_name DESC"
    );
}

#[test]
fn count_and_delete_all() {
    assert_eq!(
        rendered(Dialect::h2(), &user(), StatementName::Count),
        "select count(*) from ds_user \"User\""
    );
    assert_eq!(
        rendered(Dialect::h2(), &user(), StatementName::DeleteAll),
        "truncate table ds_user"
    );
}

#[test]
fn delete_by_id_drops_the_alias_when_unsupported() {
    assert_eq!(
        rendered(Dialect::h2(), &user(), StatementName::DeleteById),
        "delete from ds_user where id=#{id}"
    );
}

#[test]
fn delete_by_id_keeps_the_alias_on_mysql() {
    assert_eq!(
        rendered(Dialect::mysql(), &user(), StatementName::DeleteById),
        "delete `User` from ds_user `User` where `User`.id=#{id}"
    );
}

#[test]
fn paged_find_appends_limit_offset_on_h2() {
    let sql = rendered(Dialect::h2(), &user(), StatementName::FindByPager);
    assert!(sql.starts_with("select \"User\".id as \"id\""));
    assert!(sql.ends_with(" limit #{pageSize} offset #{offset}"));
}

#[test]
fn paged_find_wraps_with_rownum_on_oracle() {
    let sql = rendered(Dialect::oracle(), &user(), StatementName::FindByPager);
    assert!(sql.starts_with("select * from ( select row_.*, rownum rownum_ from ( select "));
    assert!(sql.ends_with(" ) row_ where rownum <= #{offsetEnd}) where rownum_ > #{offset}"));
}

#[test]
fn paged_find_without_limit_support_returns_the_plain_select() {
    assert_eq!(
        rendered(Dialect::ansi(), &user(), StatementName::FindByPager),
        rendered(Dialect::ansi(), &user(), StatementName::FindAll)
    );
}

#[test]
fn composite_id_uses_dotted_parameter_paths() {
    let entity = EntityDescriptor::builder("OrderLine", "order_line")
        .composite_id(
            "pk",
            vec![
                PropertyDescriptor::new("orderId", SqlType::BigInt, ValueKind::Numeric),
                PropertyDescriptor::new("lineNo", SqlType::Integer, ValueKind::Numeric),
            ],
        )
        .property(PropertyDescriptor::new(
            "quantity",
            SqlType::Integer,
            ValueKind::Numeric,
        ))
        .build();

    assert_eq!(
        rendered(Dialect::h2(), &entity, StatementName::Insert),
        "insert into order_line(order_id,line_no,quantity) \
         values(#{pk.orderId},#{pk.lineNo},#{quantity})"
    );
    assert_eq!(
        rendered(Dialect::h2(), &entity, StatementName::DeleteById),
        "delete from order_line where order_id=#{pk.orderId} and line_no=#{pk.lineNo}"
    );
    // composite keys get no flat ids-list filter
    let params = Params::new().ids(vec![json!(1)]);
    assert!(!rendered_with(Dialect::h2(), &entity, StatementName::FindAll, &params).contains("in ("));
}

#[test]
fn embedded_properties_flatten_into_writes() {
    let entity = EntityDescriptor::builder("Customer", "customer")
        .id(PropertyDescriptor::new("id", SqlType::BigInt, ValueKind::Numeric))
        .property(PropertyDescriptor::new(
            "name",
            SqlType::VarChar,
            ValueKind::String,
        ))
        .embedded(
            "address",
            vec![
                PropertyDescriptor::new("city", SqlType::VarChar, ValueKind::String),
                PropertyDescriptor::new("street", SqlType::VarChar, ValueKind::String),
            ],
        )
        .build();

    assert_eq!(
        rendered(Dialect::h2(), &entity, StatementName::Insert),
        "insert into customer(id,name,city,street) \
         values(#{id},#{name},#{address.city},#{address.street})"
    );

    let params = Params::new().value("address", json!({"city": "Basel"}));
    assert_eq!(
        rendered_with(Dialect::h2(), &entity, StatementName::UpdateIgnoreNull, &params),
        "update customer set city=#{address.city} where id=#{id}"
    );
}

#[test]
fn transient_properties_take_part_in_nothing() {
    let entity = EntityDescriptor::builder("User", "ds_user")
        .id(PropertyDescriptor::new("id", SqlType::BigInt, ValueKind::Numeric))
        .property(PropertyDescriptor::new(
            "userName",
            SqlType::VarChar,
            ValueKind::String,
        ))
        .property(
            PropertyDescriptor::new("cached", SqlType::VarChar, ValueKind::String).transient(),
        )
        .build();
    for name in [StatementName::Insert, StatementName::Update, StatementName::FindAll] {
        assert!(!rendered(Dialect::h2(), &entity, name).contains("cached"));
    }
}

#[test]
fn quoted_column_names_follow_the_dialect() {
    let entity = EntityDescriptor::builder("Reservation", "reservation")
        .id(PropertyDescriptor::new("id", SqlType::BigInt, ValueKind::Numeric))
        .property(
            PropertyDescriptor::new("order", SqlType::VarChar, ValueKind::String).column("`order`"),
        )
        .build();
    assert_eq!(
        rendered(Dialect::h2(), &entity, StatementName::Insert),
        "insert into reservation(id,\"order\") values(#{id},#{order})"
    );
    assert_eq!(
        rendered(Dialect::mysql(), &entity, StatementName::Insert),
        "insert into reservation(id,`order`) values(#{id},#{order})"
    );
}

#[test]
fn generation_is_idempotent() {
    let generator = StatementGenerator::new(Dialect::oracle());
    let entity = versioned_user();
    let first = generator.generate(&entity);
    let second = generator.generate(&entity);
    for name in StatementName::ALL {
        let a = first.get(name).map(|s| s.render(&Params::new()));
        let b = second.get(name).map(|s| s.render(&Params::new()));
        assert_eq!(a, b);
    }
}
