// test of MacPaint picture module
use mackit::img::{packbits,pntg,Raster,Fill};
use mackit::img::pntg::{Painting,WriteOptions};

fn white_scanlines() -> Vec<u8> {
    // each all-white row compresses to a single repeat packet
    let mut ans = Vec::new();
    for _row in 0..pntg::HEIGHT {
        ans.push(0xb9); // -71
        ans.push(0x00);
    }
    ans
}

fn plain_header() -> Vec<u8> {
    let mut ans = vec![0;pntg::HEADER_SIZE];
    ans[3] = 2;
    ans
}

#[test]
fn packbits_repeat_run() {
    let row = [0u8;72];
    let packed = packbits::pack_scanline(&row);
    assert_eq!(packed,vec![0xb9,0x00]);
    let (unpacked,consumed) = packbits::unpack_scanline(&packed,72).expect("could not unpack");
    assert_eq!(unpacked,row.to_vec());
    assert_eq!(consumed,2);
}

#[test]
fn packbits_all_distinct() {
    let row: Vec<u8> = (0..72).collect();
    let packed = packbits::pack_scanline(&row);
    assert_eq!(packed.len(),73);
    assert_eq!(packed[0],71);
    let (unpacked,consumed) = packbits::unpack_scanline(&packed,72).expect("could not unpack");
    assert_eq!(unpacked,row);
    assert_eq!(consumed,73);
}

#[test]
fn packbits_mixed_content() {
    let mut row = vec![0x11,0x22,0x33];
    row.append(&mut vec![0x44;20]);
    row.append(&mut vec![0x55,0x66]);
    row.append(&mut vec![0x00;47]);
    assert_eq!(row.len(),72);
    let packed = packbits::pack_scanline(&row);
    let (unpacked,_consumed) = packbits::unpack_scanline(&packed,72).expect("could not unpack");
    assert_eq!(unpacked,row);
    assert!(packed.len() <= 73);
}

#[test]
fn packbits_no_op_control() {
    // 0x80 = -128 must be skipped without producing output
    let packed = vec![0x80,0xb9,0x00];
    let (unpacked,consumed) = packbits::unpack_scanline(&packed,72).expect("could not unpack");
    assert_eq!(unpacked,vec![0u8;72]);
    assert_eq!(consumed,3);
}

#[test]
fn packbits_corrupt_input() {
    // literal claims 1 byte then the input ends
    match packbits::unpack_scanline(&[0x00],72) {
        Ok(_) => panic!("unpacked truncated input"),
        Err(e) => assert_eq!(e.to_string(),"image data is damaged")
    }
    // a 73 byte repeat overruns the scanline
    match packbits::unpack_scanline(&[0xb8,0x00],72) {
        Ok(_) => panic!("unpacked an overlong scanline"),
        Err(e) => assert_eq!(e.to_string(),"image data is damaged")
    }
    // input exhausted before 72 bytes exist
    match packbits::unpack_scanline(&[0xff,0x00],72) {
        Ok(_) => panic!("unpacked a short scanline"),
        Err(e) => assert_eq!(e.to_string(),"image data is damaged")
    }
}

#[test]
fn detects_macbinary_wrapper() {
    let mut wrapped = vec![0;pntg::MACBINARY_SIZE];
    wrapped[1] = 0x20;
    wrapped[65..69].copy_from_slice(b"PNTG");
    wrapped.append(&mut plain_header());
    wrapped.append(&mut white_scanlines());
    let painting = Painting::from_bytes(&wrapped).expect("could not parse");
    assert_eq!(painting.raster.width,pntg::WIDTH);
    assert_eq!(painting.raster.height,pntg::HEIGHT);
    assert_eq!(painting.raster.pixel(0,0),[255,255,255,255]);
}

#[test]
fn parses_bare_file() {
    let mut bare = plain_header();
    bare.append(&mut white_scanlines());
    let painting = Painting::from_bytes(&bare).expect("could not parse");
    assert_eq!(painting.raster.pixel(575,719),[255,255,255,255]);
    assert_eq!(painting.patterns,Some([[0;8];38]));
}

#[test]
fn rejects_short_input() {
    match Painting::from_bytes(&vec![0;100]) {
        Ok(_) => panic!("parsed a 100 byte file"),
        Err(e) => assert_eq!(e.to_string(),"not a MacPaint file")
    }
    // header but no scanline data
    match Painting::from_bytes(&plain_header()) {
        Ok(_) => panic!("parsed a file with no scanlines"),
        Err(e) => assert_eq!(e.to_string(),"image data is damaged")
    }
}

#[test]
fn serialize_parse_round_trip() {
    // left half black, right half white survives the 1-bit round trip
    let mut raster = Raster::new(pntg::WIDTH,pntg::HEIGHT,Fill::White);
    for y in 0..pntg::HEIGHT {
        for x in 0..pntg::WIDTH/2 {
            raster.set_pixel(x,y,[0,0,0,255]);
        }
    }
    let mut patterns = [[0u8;8];38];
    patterns[0] = [0xaa,0x55,0xaa,0x55,0xaa,0x55,0xaa,0x55];
    let mut opts = WriteOptions::new();
    opts.patterns = Some(patterns);
    let painting = Painting::from_raster(raster.clone());
    let dat = painting.to_bytes(&opts).expect("could not serialize");
    assert_eq!(u32::from_be_bytes([dat[0],dat[1],dat[2],dat[3]]),2);

    let back = Painting::from_bytes(&dat).expect("could not parse");
    assert_eq!(back.raster,raster);
    assert_eq!(back.patterns,Some(patterns));

    // a reparsed painting reuses its stored patterns
    let dat2 = back.to_bytes(&WriteOptions::new()).expect("could not serialize");
    assert_eq!(dat2,dat);
}

#[test]
fn serialize_scales_and_pads() {
    // a small gray image is scaled up to full size
    let small = Raster::new(100,100,Fill::Black);
    let dat = Painting::from_raster(small).to_bytes(&WriteOptions::new()).expect("could not serialize");
    let painting = Painting::from_bytes(&dat).expect("could not parse");
    assert_eq!(painting.raster.pixel(300,300),[0,0,0,255]);

    // with padding configured the small image lands at the offset instead
    let small = Raster::new(100,100,Fill::Black);
    let mut opts = WriteOptions::new();
    opts.padding = Some(pntg::Padding { x: 10, y: 20, fill: Fill::White });
    let dat = Painting::from_raster(small).to_bytes(&opts).expect("could not serialize");
    let painting = Painting::from_bytes(&dat).expect("could not parse");
    assert_eq!(painting.raster.pixel(0,0),[255,255,255,255]);
    assert_eq!(painting.raster.pixel(50,50),[0,0,0,255]);
    assert_eq!(painting.raster.pixel(200,200),[255,255,255,255]);
}

#[test]
fn serialize_crops() {
    // crop the black quadrant out of a larger image
    let mut raster = Raster::new(pntg::WIDTH*2,pntg::HEIGHT*2,Fill::White);
    for y in 0..pntg::HEIGHT {
        for x in 0..pntg::WIDTH {
            raster.set_pixel(x,y,[0,0,0,255]);
        }
    }
    let mut opts = WriteOptions::new();
    opts.crop = Some(mackit::img::Rect { x: 0, y: 0, width: pntg::WIDTH, height: pntg::HEIGHT });
    let dat = Painting::from_raster(raster).to_bytes(&opts).expect("could not serialize");
    let painting = Painting::from_bytes(&dat).expect("could not parse");
    for probe in [(0,0),(575,719),(288,360)] {
        assert_eq!(painting.raster.pixel(probe.0,probe.1),[0,0,0,255]);
    }
}

#[test]
fn scanline_budget() {
    // every scanline of a dithered checkerboard still fits in 73 bytes
    let mut raster = Raster::new(pntg::WIDTH,pntg::HEIGHT,Fill::White);
    for y in 0..pntg::HEIGHT {
        for x in 0..pntg::WIDTH {
            if (x + y) % 2 == 0 {
                raster.set_pixel(x,y,[0,0,0,255]);
            }
        }
    }
    let dat = Painting::from_raster(raster).to_bytes(&WriteOptions::new()).expect("could not serialize");
    assert!(dat.len() <= pntg::HEADER_SIZE + pntg::HEIGHT*73);
}
