//! Program fixtures with known call graphs
//!
//! Each fixture is a small package `main` and the dynamic edges CHA must
//! find in it, rendered relative to `main`.

use codegraph_cha::{
    CallSite, CallTarget, Function, FunctionOrigin, MethodDescriptor, Program, ProgramBuilder,
    Receiver, Signature, Type, TypeName,
};

pub fn float_result() -> Signature {
    Signature::new(vec![], vec![Type::basic("float64")])
}

fn int_param() -> Signature {
    Signature::new(vec![Type::basic("int")], vec![])
}

/// `Shape{Area() float64}` implemented by `Circle` and `*Square`;
/// `ComputeAll` calls `Area` through a `Shape`, `Describe` makes no calls.
pub fn shapes_program() -> Program {
    let mut b = ProgramBuilder::new("main");
    let shape = b.interface("Shape", [("Area", float_result())]);
    let circle = b.named_type("Circle");
    let square = b.named_type("Square");
    b.method(Receiver::value(circle), "Area", float_result());
    b.method(Receiver::pointer(square), "Area", float_result());

    let shape_param = Signature::new(vec![Type::Named(shape.clone())], vec![]);
    let compute = b.function("ComputeAll", shape_param);
    b.invoke(compute, MethodDescriptor::new(shape, "Area", float_result()));
    b.function("Describe", Signature::empty());
    b.build().expect("shapes fixture is valid")
}

pub const SHAPES_WANT: &str = "\
Dynamic calls
  ComputeAll --> (*Square).Area
  ComputeAll --> (Circle).Area";

/// Interface calls where one type implements only part of an interface.
///
/// ```text
/// type I interface { f() }
/// type J interface { f(); g() }
/// func (*C) f()
/// func (*D) f(); func (*D) g()
///
/// one:   i.f()
/// two:   j.f()
/// three: j.g()
/// four:  Jf := J.f; Jf(j)   (method expression thunk)
/// five:  jf := j.f; jf()    (bound method closure)
/// ```
pub fn iface_program() -> Program {
    let mut b = ProgramBuilder::new("main");
    let i = b.interface("I", [("f", Signature::empty())]);
    let j = b.interface("J", [("f", Signature::empty()), ("g", Signature::empty())]);
    let c = b.named_type("C");
    let d = b.named_type("D");
    b.method(Receiver::pointer(c), "f", Signature::empty());
    b.method(Receiver::pointer(d.clone()), "f", Signature::empty());
    b.method(Receiver::pointer(d), "g", Signature::empty());

    let ij = Signature::new(vec![Type::Named(i.clone()), Type::Named(j.clone())], vec![]);
    let j_only = Signature::new(vec![Type::Named(j.clone())], vec![]);
    let if_ = MethodDescriptor::new(i, "f", Signature::empty());
    let jf = MethodDescriptor::new(j.clone(), "f", Signature::empty());
    let jg = MethodDescriptor::new(j, "g", Signature::empty());

    let thunk = b.add_function(
        Function::new("main", "(J).f$thunk", j_only.clone()).with_origin(FunctionOrigin::Synthetic),
    );
    b.invoke(thunk, jf.clone());
    let bound = b.add_function(
        Function::new("main", "(J).f$bound", Signature::empty())
            .with_origin(FunctionOrigin::Closure),
    );
    b.invoke(bound, jf.clone());

    let one = b.function("one", ij.clone());
    b.invoke(one, if_);
    let two = b.function("two", ij.clone());
    b.invoke(two, jf);
    let three = b.function("three", ij.clone());
    b.invoke(three, jg);
    let four = b.function("four", ij.clone());
    b.call_indirect(four, j_only);
    let five = b.function("five", ij);
    b.call_indirect(five, Signature::empty());

    // Same signature as the bound closure, but never address-taken
    b.add_function(
        Function::new("main", "init", Signature::empty()).with_origin(FunctionOrigin::PackageInit),
    );
    b.build().expect("iface fixture is valid")
}

/// Golden output when the whole interface must be implemented
pub const IFACE_WANT: &str = "\
Dynamic calls
  (J).f$bound --> (*D).f
  (J).f$thunk --> (*D).f
  five --> (J).f$bound
  four --> (J).f$thunk
  one --> (*C).f
  one --> (*D).f
  three --> (*D).g
  two --> (*D).f";

/// Golden output when a matching method alone is enough: `*C` now also
/// answers `j.f()`
pub const IFACE_METHOD_MATCH_WANT: &str = "\
Dynamic calls
  (J).f$bound --> (*C).f
  (J).f$bound --> (*D).f
  (J).f$thunk --> (*C).f
  (J).f$thunk --> (*D).f
  five --> (J).f$bound
  four --> (J).f$thunk
  one --> (*C).f
  one --> (*D).f
  three --> (*D).g
  two --> (*C).f
  two --> (*D).f";

/// Value and pointer receivers, including the synthetic `(*C).f` wrapper
///
/// ```text
/// func (C) f(); func (*C) g()
/// func (*D) f(); func (*D) g()
/// func f(i I) { i.f() }
/// func g(j J) { j.g() }
/// ```
pub fn recv_program() -> Program {
    Program::from_json(RECV_JSON).expect("recv fixture is valid")
}

pub const RECV_JSON: &str = include_str!("../fixtures/recv.json");

pub const RECV_WANT: &str = "\
Dynamic calls
  f --> (*C).f
  f --> (*D).f
  f --> (C).f
  g --> (*C).g
  g --> (*D).g";

/// Calls through function values, no interfaces.
///
/// ```text
/// func A(int) {}
/// var B = func(int) {}   // init$1
/// var C = func(int) {}   // init$2
/// func f() { pfn := B; pfn(0) }
/// ```
pub fn func_program() -> Program {
    let mut b = ProgramBuilder::new("main");
    b.function("A", int_param());
    let init = b.add_function(
        Function::new("main", "init", Signature::empty()).with_origin(FunctionOrigin::PackageInit),
    );
    b.add_function(Function::new("main", "init$1", int_param()).with_origin(FunctionOrigin::Closure));
    b.add_function(Function::new("main", "init$2", int_param()).with_origin(FunctionOrigin::Closure));
    let f = b.function("f", Signature::empty());
    b.call_site(
        f,
        CallSite::new(CallTarget::Indirect {
            signature: int_param(),
        }),
    );
    b.call_builtin(init, "new");
    b.build().expect("func fixture is valid")
}

pub const FUNC_WANT: &str = "\
Dynamic calls
  f --> A
  f --> init$1
  f --> init$2";

/// Promotion through embedded fields.
///
/// ```text
/// type Base struct{}; func (Base) Name() string; func (*Base) Reset()
/// type Outer struct{ Base }
/// type Holder struct{ *Base }
/// type Named interface { Name() string }
/// type Resetter interface { Reset() }
/// ```
pub fn embedding_program() -> Program {
    let mut b = ProgramBuilder::new("main");
    let string_result = Signature::new(vec![], vec![Type::basic("string")]);
    let named = b.interface("Named", [("Name", string_result.clone())]);
    let resetter = b.interface("Resetter", [("Reset", Signature::empty())]);
    let base = b.named_type("Base");
    b.struct_type("Outer", vec![embedded(&base, false)]);
    b.struct_type("Holder", vec![embedded(&base, true)]);
    b.method(Receiver::value(base.clone()), "Name", string_result.clone());
    b.method(Receiver::pointer(base), "Reset", Signature::empty());

    let use_named = b.function("useNamed", Signature::empty());
    b.invoke(use_named, MethodDescriptor::new(named, "Name", string_result));
    let use_reset = b.function("useReset", Signature::empty());
    b.invoke(use_reset, MethodDescriptor::new(resetter, "Reset", Signature::empty()));
    b.build().expect("embedding fixture is valid")
}

fn embedded(ty: &TypeName, pointer: bool) -> codegraph_cha::EmbeddedField {
    codegraph_cha::EmbeddedField {
        ty: ty.clone(),
        pointer,
    }
}

/// Promoted methods resolve to the embedded type's own functions, so each
/// call still reaches a single implementation
pub const EMBEDDING_WANT: &str = "\
Dynamic calls
  useNamed --> (Base).Name
  useReset --> (*Base).Reset";

/// Selector shadowing through embedding. `(*Inner).M` hides `(Deep).M` from
/// `Outer`, so only `*Outer` has both `M` and `N`. `Both` embeds `(A).K` and
/// `(*B).K` at the same depth, so `K` is ambiguous in either mode.
pub fn shadowing_program() -> Program {
    let mut b = ProgramBuilder::new("main");
    let iface_i = b.interface("I", [("M", Signature::empty()), ("N", Signature::empty())]);
    let iface_j = b.interface("J", [("K", Signature::empty()), ("L", Signature::empty())]);

    let deep = b.named_type("Deep");
    b.method(Receiver::value(deep.clone()), "M", Signature::empty());
    let inner = b.struct_type("Inner", vec![embedded(&deep, false)]);
    b.method(Receiver::pointer(inner.clone()), "M", Signature::empty());
    let outer = b.struct_type("Outer", vec![embedded(&inner, false)]);
    b.method(Receiver::value(outer), "N", Signature::empty());

    let a = b.named_type("A");
    let bt = b.named_type("B");
    b.method(Receiver::value(a.clone()), "K", Signature::empty());
    b.method(Receiver::pointer(bt.clone()), "K", Signature::empty());
    let both = b.struct_type("Both", vec![embedded(&a, false), embedded(&bt, false)]);
    b.method(Receiver::value(both), "L", Signature::empty());

    for (caller, iface, method) in [
        ("useM", &iface_i, "M"),
        ("useN", &iface_i, "N"),
        ("useK", &iface_j, "K"),
        ("useL", &iface_j, "L"),
    ] {
        let f = b.function(caller, Signature::empty());
        b.invoke(f, MethodDescriptor::new(iface.clone(), method, Signature::empty()));
    }
    b.build().expect("shadowing fixture is valid")
}

/// Whole-interface dispatch: no type satisfies `J`
pub const SHADOWING_WANT: &str = "\
Dynamic calls
  useM --> (*Inner).M
  useN --> (Outer).N";

pub const SHADOWING_METHOD_MATCH_WANT: &str = "\
Dynamic calls
  useK --> (*B).K
  useK --> (A).K
  useL --> (Both).L
  useM --> (*Inner).M
  useM --> (Deep).M
  useN --> (Outer).N";
