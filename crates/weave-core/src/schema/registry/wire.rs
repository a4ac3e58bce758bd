use super::Registry;
use crate::{
    schema::{
        Accessors, Association, AssociationKind, AssociationOptions, AssociationSpec, Attribute,
        Model, ModelId, Name, NormalizedAssociation, Relation, Through,
    },
    Error, Result,
};

/// Everything one declaration adds to the registry, computed up front so a
/// failing declaration installs nothing.
#[derive(Debug, Default)]
pub(super) struct Plan {
    /// New association edges
    edges: Vec<Association>,

    /// Key attributes to add to a model unless it already declares them
    attributes: Vec<(ModelId, String, Attribute)>,

    /// Existing edges that gain a pair: (model, accessor, pair accessor)
    pairs: Vec<(ModelId, String, String)>,
}

impl Registry {
    pub(super) fn plan(
        &self,
        source: ModelId,
        kind: AssociationKind,
        spec: &AssociationSpec,
    ) -> Result<Plan> {
        let NormalizedAssociation {
            target,
            forward,
            reverse,
        } = spec.normalize()?;

        let source = self.model(source);
        let target = self.model_by_name(&target)?;

        match kind {
            AssociationKind::OneToOne => {
                self.plan_belongs_to(source, target, Relation::HasOne, &forward, &reverse)
            }
            AssociationKind::OneToMany => {
                self.plan_belongs_to(source, target, Relation::HasMany, &forward, &reverse)
            }
            AssociationKind::ManyToMany => {
                self.plan_many_to_many(source, target, &forward, &reverse)
            }
        }
    }

    pub(super) fn install(&mut self, plan: Plan) {
        for (model, name, attribute) in plan.attributes {
            self.models[model.0]
                .attributes
                .entry(name)
                .or_insert(attribute);
        }

        for edge in plan.edges {
            tracing::debug!(
                model = %self.models[edge.source.0].name,
                accessor = %edge.name,
                relation = %edge.relation,
                target = %self.models[edge.target.0].name,
                "wired association"
            );

            self.models[edge.source.0]
                .associations
                .insert(edge.name.clone(), edge);
        }

        for (model, name, pair) in plan.pairs {
            if let Some(edge) = self.models[model.0].associations.get_mut(&name) {
                edge.pair.get_or_insert(pair);
            }
        }
    }

    /// `source` belongs to `target`; `target` has one or many `source`.
    fn plan_belongs_to(
        &self,
        source: &Model,
        target: &Model,
        inverse: Relation,
        forward: &AssociationOptions,
        reverse: &AssociationOptions,
    ) -> Result<Plan> {
        single_key(source)?;
        let target_key = single_key(target)?;

        let accessor = forward
            .as_name
            .clone()
            .unwrap_or_else(|| Name::new(&target.name).camel_case());

        let inverse_accessor = reverse.as_name.clone().unwrap_or_else(|| {
            let name = Name::new(&source.name);
            if inverse.is_many() {
                name.plural().camel_case()
            } else {
                name.camel_case()
            }
        });

        let foreign_key = match (&forward.foreign_key, &reverse.foreign_key) {
            (Some(lhs), Some(rhs)) if lhs != rhs => {
                return Err(Error::invalid_association(format!(
                    "conflicting foreign keys `{lhs}` and `{rhs}` between `{}` and `{}`",
                    source.name, target.name
                )))
            }
            (Some(foreign_key), _) | (None, Some(foreign_key)) => foreign_key.clone(),
            (None, None) => source.key_name(&accessor),
        };

        let with_inverse = !reverse.disabled;

        check_accessor(source, &accessor)?;
        if with_inverse {
            check_accessor(target, &inverse_accessor)?;
            if source.id == target.id && accessor == inverse_accessor {
                return Err(duplicate_accessor(source, &accessor));
            }
        }

        let mut plan = Plan::default();

        plan.attributes.push((
            source.id,
            foreign_key.clone(),
            Attribute::new(target_key.ty),
        ));

        plan.edges.push(Association {
            name: accessor.clone(),
            relation: Relation::BelongsTo,
            source: source.id,
            target: target.id,
            foreign_key: foreign_key.clone(),
            through: None,
            pair: with_inverse.then(|| inverse_accessor.clone()),
            accessors: Accessors::new(&accessor, &accessor),
        });

        if with_inverse {
            plan.edges.push(Association {
                accessors: Accessors::new(
                    &inverse_accessor,
                    &Name::new(&source.name).camel_case(),
                ),
                name: inverse_accessor,
                relation: inverse,
                source: target.id,
                target: source.id,
                foreign_key,
                through: None,
                pair: Some(accessor),
            });
        }

        Ok(plan)
    }

    /// `source` and `target` belong to many of each other through a join
    /// table.
    fn plan_many_to_many(
        &self,
        source: &Model,
        target: &Model,
        forward: &AssociationOptions,
        reverse: &AssociationOptions,
    ) -> Result<Plan> {
        let source_pk = single_key(source)?;
        let target_pk = single_key(target)?;

        let accessor = forward
            .as_name
            .clone()
            .unwrap_or_else(|| Name::new(&target.name).plural().camel_case());

        let inverse_accessor = reverse
            .as_name
            .clone()
            .unwrap_or_else(|| Name::new(&source.name).plural().camel_case());

        // An edge installed by the other model's declaration of the same
        // association.
        let counterpart = is_many_to_many(source, &accessor, target.id)
            .or_else(|| is_many_to_many(target, &inverse_accessor, source.id));

        let declared = match (&forward.through, &reverse.through) {
            (Some(lhs), Some(rhs)) if lhs != rhs => return Err(conflicting_through(lhs, rhs)),
            (Some(through), _) | (None, Some(through)) => Some(through),
            (None, None) => None,
        };

        let through_name = match (declared, counterpart.map(|through| &through.name)) {
            (Some(lhs), Some(rhs)) if lhs != rhs => return Err(conflicting_through(lhs, rhs)),
            (Some(name), _) | (None, Some(name)) => name.clone(),
            (None, None) => {
                return Err(Error::invalid_association(format!(
                    "many-to-many association between `{}` and `{}` needs a `through` table",
                    source.name, target.name
                )))
            }
        };

        let through_model = self.get(&through_name);

        let source_key = forward
            .foreign_key
            .clone()
            .unwrap_or_else(|| source.key_name(&source.name));
        let target_key = reverse
            .foreign_key
            .clone()
            .unwrap_or_else(|| source.key_name(&target.name));

        if source_key == target_key {
            return Err(Error::invalid_association(format!(
                "through table `{through_name}` would use `{source_key}` for both sides, \
                 set `foreign_key` on both options"
            )));
        }

        let through = Through {
            table: through_model
                .map(|model| model.table_name.clone())
                .unwrap_or_else(|| through_name.clone()),
            model: through_model.map(|model| model.id),
            name: through_name,
            source_key,
            target_key,
        };

        let mut plan = Plan::default();

        if let Some(through_model) = through_model {
            plan.attributes.push((
                through_model.id,
                through.source_key.clone(),
                Attribute::new(source_pk.ty),
            ));
            plan.attributes.push((
                through_model.id,
                through.target_key.clone(),
                Attribute::new(target_pk.ty),
            ));
        }

        let with_inverse = !reverse.disabled;

        let edges = [
            Some((source, target, accessor.clone(), inverse_accessor.clone(), through.clone())),
            with_inverse.then(|| (target, source, inverse_accessor, accessor, through.reversed())),
        ];

        for (owner, other, name, pair, through) in edges.into_iter().flatten() {
            if let Some(existing) = owner.association(&name) {
                if is_many_to_many(owner, &name, other.id)
                    .is_some_and(|current| current.name == through.name)
                {
                    if existing.pair.is_none() && with_inverse {
                        plan.pairs.push((owner.id, name, pair));
                    }
                    continue;
                }
                return Err(duplicate_accessor(owner, &name));
            }

            check_accessor(owner, &name)?;

            plan.edges.push(Association {
                accessors: Accessors::new(&name, &Name::new(&other.name).camel_case()),
                relation: Relation::BelongsToMany,
                source: owner.id,
                target: other.id,
                foreign_key: through.source_key.clone(),
                through: Some(through),
                pair: with_inverse.then_some(pair),
                name,
            });
        }

        if source.id == target.id
            && plan
                .edges
                .first()
                .zip(plan.edges.get(1))
                .is_some_and(|(lhs, rhs)| lhs.name == rhs.name)
        {
            return Err(duplicate_accessor(source, &plan.edges[0].name));
        }

        Ok(plan)
    }
}

/// The single primary-key attribute an associated model must have.
fn single_key(model: &Model) -> Result<&Attribute> {
    let mut keys = model.primary_key();

    match (keys.next(), keys.next()) {
        (Some(name), None) => Ok(&model.attributes[name]),
        _ => Err(Error::invalid_association(format!(
            "`{}` must declare exactly one primary-key attribute to take part in an association",
            model.name
        ))),
    }
}

/// Through table of `owner`'s many-to-many edge `name` pointing at `target`.
fn is_many_to_many<'a>(owner: &'a Model, name: &str, target: ModelId) -> Option<&'a Through> {
    owner
        .association(name)
        .filter(|edge| edge.relation == Relation::BelongsToMany && edge.target == target)
        .and_then(|edge| edge.through.as_ref())
}

fn check_accessor(model: &Model, name: &str) -> Result<()> {
    if model.associations.contains_key(name) || model.attributes.contains_key(name) {
        return Err(duplicate_accessor(model, name));
    }
    Ok(())
}

fn duplicate_accessor(model: &Model, name: &str) -> Error {
    Error::invalid_association(format!(
        "`{}` already has an attribute or association named `{name}`, use `as` to rename the accessor",
        model.name
    ))
}

fn conflicting_through(lhs: &str, rhs: &str) -> Error {
    Error::invalid_association(format!(
        "conflicting through tables `{lhs}` and `{rhs}`, both sides of a many-to-many association must use the same table"
    ))
}
