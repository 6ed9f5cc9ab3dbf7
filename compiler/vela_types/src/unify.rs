//! Generic signatures and their instantiation.
//!
//! Built-in functions are declared over [`Type::Param`] placeholders.
//! A call instantiates the signature from explicit type arguments when
//! given, otherwise by matching parameter types structurally against the
//! argument types.

use std::fmt;
use std::sync::Arc;

use crate::{common_type, is_assignable, FunctionType, TupleType, Type, TypeFlags};

/// A possibly generic function signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    pub params: Vec<Type>,
    pub ret: Type,
    /// One entry per generic parameter: flags its binding must carry.
    pub generics: Vec<TypeFlags>,
}

/// A signature with every generic parameter bound.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instance {
    pub params: Vec<Type>,
    pub ret: Type,
    pub type_args: Vec<Type>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SignatureError {
    Arity { expected: usize, found: usize },
    TypeArgCount { expected: usize, found: usize },
    /// Nothing in the call determines this parameter.
    Unresolved(u8),
    Constraint { param: u8, ty: Type },
    Mismatch { index: usize, expected: Type, found: Type },
}

impl fmt::Display for SignatureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignatureError::Arity { expected, found } => {
                write!(f, "expected {expected} argument(s), found {found}")
            }
            SignatureError::TypeArgCount { expected, found } => {
                write!(f, "expected {expected} type argument(s), found {found}")
            }
            SignatureError::Unresolved(i) => {
                write!(f, "cannot infer generic parameter T{i}; pass it explicitly")
            }
            SignatureError::Constraint { param, ty } => {
                write!(f, "`{ty}` is not a valid argument for generic parameter T{param}")
            }
            SignatureError::Mismatch {
                index,
                expected,
                found,
            } => write!(
                f,
                "argument {} has type `{found}`, expected `{expected}`",
                index + 1
            ),
        }
    }
}

impl Signature {
    /// A signature without generic parameters.
    pub fn plain(params: Vec<Type>, ret: Type) -> Self {
        Signature {
            params,
            ret,
            generics: Vec::new(),
        }
    }

    pub fn generic(generics: Vec<TypeFlags>, params: Vec<Type>, ret: Type) -> Self {
        Signature {
            params,
            ret,
            generics,
        }
    }

    /// Bind the generic parameters and check the arguments.
    pub fn instantiate(
        &self,
        explicit: &[Type],
        args: &[Type],
    ) -> Result<Instance, SignatureError> {
        if args.len() != self.params.len() {
            return Err(SignatureError::Arity {
                expected: self.params.len(),
                found: args.len(),
            });
        }

        let mut bindings: Vec<Option<Type>> = vec![None; self.generics.len()];
        if !explicit.is_empty() {
            if explicit.len() != self.generics.len() {
                return Err(SignatureError::TypeArgCount {
                    expected: self.generics.len(),
                    found: explicit.len(),
                });
            }
            for (slot, ty) in bindings.iter_mut().zip(explicit) {
                *slot = Some(ty.clone());
            }
        } else {
            for (index, (param, arg)) in self.params.iter().zip(args).enumerate() {
                if !unify(param, arg, &mut bindings) {
                    return Err(SignatureError::Mismatch {
                        index,
                        expected: param.clone(),
                        found: arg.clone(),
                    });
                }
            }
        }

        let mut type_args = Vec::with_capacity(bindings.len());
        for (i, (binding, required)) in bindings.into_iter().zip(&self.generics).enumerate() {
            let param = u8::try_from(i).unwrap_or(u8::MAX);
            let ty = binding.ok_or(SignatureError::Unresolved(param))?;
            if !ty.flags().contains(*required) {
                return Err(SignatureError::Constraint { param, ty });
            }
            type_args.push(ty);
        }

        let params: Vec<Type> = self.params.iter().map(|p| substitute(p, &type_args)).collect();
        for (index, (param, arg)) in params.iter().zip(args).enumerate() {
            if !is_assignable(arg, param) {
                return Err(SignatureError::Mismatch {
                    index,
                    expected: param.clone(),
                    found: arg.clone(),
                });
            }
        }
        Ok(Instance {
            ret: substitute(&self.ret, &type_args),
            params,
            type_args,
        })
    }
}

/// Match `actual` against `pattern`, recording bindings for parameters.
///
/// A parameter seen twice widens to the common type of both sightings;
/// the empty selectors leave their element parameter to other arguments.
fn unify(pattern: &Type, actual: &Type, bindings: &mut [Option<Type>]) -> bool {
    match (pattern, actual) {
        (Type::Param(i), _) => {
            let Some(slot) = bindings.get_mut(usize::from(*i)) else {
                return false;
            };
            let next = match slot.take() {
                None | Some(Type::Void) => actual.clone(),
                Some(bound) => match common_type(&bound, actual) {
                    Some(common) => common,
                    None => {
                        *slot = Some(bound);
                        return false;
                    }
                },
            };
            *slot = Some(next);
            true
        }
        (Type::Set(p), Type::Set(a)) | (Type::List(p), Type::List(a)) => {
            if **a == Type::Void {
                bind_void(p, bindings);
                return true;
            }
            unify(p, a, bindings)
        }
        (Type::Optional(p), _) => unify(p, actual.strip_optional(), bindings),
        (Type::Function(p), Type::Function(a)) => {
            p.params.len() == a.params.len()
                && p.params.iter().zip(&a.params).all(|(p, a)| unify(p, a, bindings))
                && unify(&p.ret, &a.ret, bindings)
        }
        _ if pattern.has_params() => false,
        _ => is_assignable(actual, pattern),
    }
}

/// An empty collection argument says nothing about its element type;
/// fall back to `Void` only if nothing else binds the parameter.
fn bind_void(pattern: &Type, bindings: &mut [Option<Type>]) {
    if let Type::Param(i) = pattern {
        if let Some(slot) = bindings.get_mut(usize::from(*i)) {
            if slot.is_none() {
                *slot = Some(Type::Void);
            }
        }
    }
}

/// Replace every `Param(i)` with `args[i]`.
pub(crate) fn substitute(ty: &Type, args: &[Type]) -> Type {
    if !ty.has_params() {
        return ty.clone();
    }
    match ty {
        Type::Param(i) => args.get(usize::from(*i)).cloned().unwrap_or(Type::Void),
        Type::Set(e) => Type::set(substitute(e, args)),
        Type::List(e) => Type::list(substitute(e, args)),
        Type::Optional(e) => Type::optional(substitute(e, args)),
        Type::Function(f) => Type::Function(Arc::new(FunctionType {
            params: f.params.iter().map(|p| substitute(p, args)).collect(),
            ret: substitute(&f.ret, args),
        })),
        Type::Tuple(t) => {
            let attrs = t
                .attrs()
                .iter()
                .map(|a| crate::Attribute {
                    name: a.name.clone(),
                    ty: substitute(&a.ty, args),
                })
                .collect();
            match TupleType::new(attrs, t.keys().to_vec(), t.refs().to_vec()) {
                Ok(tuple) => Type::Tuple(Arc::new(tuple)),
                Err(_) => ty.clone(),
            }
        }
        other => other.clone(),
    }
}
